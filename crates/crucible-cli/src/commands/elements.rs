//! Elements command

use std::collections::BTreeMap;
use std::fmt::Write;

use clap::Args;
use crucible_core::RuleStore;

use crate::output::OutputFormat;
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct ElementsArgs {
    /// Show the recipes of one item only
    #[arg(short, long)]
    pub item: Option<String>,
}

fn format_item(rules: &RuleStore, item: &str, format: OutputFormat) -> anyhow::Result<String> {
    if !rules.contains(item) {
        anyhow::bail!("Unknown item: {}", item);
    }

    let recipes = rules.recipes_for(item);
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&serde_json::json!({
            "item": item,
            "base": rules.is_base(item),
            "recipes": recipes,
        }))?);
    }

    let mut out = String::new();
    if rules.is_base(item) {
        writeln!(out, "{} is a base element", item)?;
    } else if recipes.is_empty() {
        writeln!(out, "{} has no known recipe", item)?;
    }
    for pair in recipes {
        writeln!(out, "{} = {} + {}", item, pair.first, pair.second)?;
    }
    Ok(out)
}

fn format_all(rules: &RuleStore, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        let table: BTreeMap<&str, usize> = rules
            .elements()
            .map(|item| (item, rules.recipes_for(item).len()))
            .collect();
        return Ok(serde_json::to_string_pretty(&table)?);
    }

    let mut out = String::new();
    for item in rules.elements() {
        let count = rules.recipes_for(item).len();
        if rules.is_base(item) {
            writeln!(out, "{} (base)", item)?;
        } else {
            writeln!(out, "{} ({} recipes)", item, count)?;
        }
    }
    writeln!(
        out,
        "\n{} elements, {} recipes",
        rules.len(),
        rules.recipe_count()
    )?;
    Ok(out)
}

pub async fn run(args: &ElementsArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let rules = ctx.rules().await?;
    let text = match &args.item {
        Some(item) => format_item(&rules, item.trim(), cli.output_format())?,
        None => format_all(&rules, cli.output_format())?,
    };
    print!("{}", text);
    Ok(())
}
