//! Command-line host for config documents.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::app::condition::ConditionSpec;
use crate::app::helper::ConfigHelper;
use crate::infra::config::Config;
use crate::infra::i18n::{CatalogLocalizer, Localizer};
use crate::infra::source::DocumentSource;

#[derive(Parser)]
#[command(author, version, about = "Build option lists from config documents", long_about = None)]
pub struct Cli {
    /// Config document (.json, .toml, .yaml).
    #[arg(long, short)]
    config: PathBuf,
    /// JSON translation catalog; overrides `[i18n] catalog`.
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render `<option>` markup for the entries under KEY
    Options {
        key: String,
        #[arg(long)]
        selected: Vec<String>,
        #[command(flatten)]
        filter: Filter,
        /// Field holding the option value instead of the entry key
        #[arg(long)]
        value_field: Option<String>,
        /// Option placed before the data, as VALUE=TITLE
        #[arg(long)]
        prepend: Vec<String>,
        #[arg(long)]
        no_optgroup: bool,
    },
    /// List keys under KEY whose entries pass the filter
    Keys {
        key: String,
        #[command(flatten)]
        filter: Filter,
        /// Require exactly one match
        #[arg(long, conflicts_with = "random")]
        single: bool,
        /// Print one matching key at random
        #[arg(long)]
        random: bool,
    },
    /// Print the value of the single entry under KEY passing the filter
    Value {
        key: String,
        #[command(flatten)]
        filter: Filter,
        /// Path inside the matched entry
        #[arg(long)]
        path: Option<String>,
    },
    /// Print KEY pruned to visible keys with translated strings
    Publish {
        key: String,
        #[arg(long)]
        visible: Vec<String>,
        #[arg(long)]
        trans: Vec<String>,
        #[command(flatten)]
        filter: Filter,
    },
}

#[derive(Args)]
struct Filter {
    /// Condition clause FIELD=JSON; numeric FIELD targets the entry key
    #[arg(long = "where", value_name = "FIELD=JSON")]
    clauses: Vec<String>,
}

impl Filter {
    fn condition(&self) -> Result<ConditionSpec> {
        self.clauses
            .iter()
            .try_fold(ConditionSpec::new(), |spec, clause| {
                let (field, raw) = clause
                    .split_once('=')
                    .ok_or_else(|| anyhow!("condition '{clause}' must look like FIELD=JSON"))?;
                let expected = serde_json::from_str(raw)
                    .unwrap_or_else(|_| Value::String(raw.to_owned()));
                Ok(spec.with(field, expected))
            })
    }
}

/// Parse arguments and run the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = execute(cli, Config::load()?)?;
    println!("{output}");
    Ok(())
}

fn execute(cli: Cli, config: Config) -> Result<String> {
    let source = DocumentSource::from_file(&cli.config)?;
    let catalog = match cli.catalog.as_ref().or(config.i18n.catalog.as_ref()) {
        Some(path) => CatalogLocalizer::from_file(path)?,
        None => CatalogLocalizer::default(),
    };
    let helper = ConfigHelper::new(source, catalog, &config);
    dispatch(&helper, cli.command)
}

fn dispatch<L: Localizer>(
    helper: &ConfigHelper<DocumentSource, L>,
    command: Commands,
) -> Result<String> {
    match command {
        Commands::Options {
            key,
            selected,
            filter,
            value_field,
            prepend,
            no_optgroup,
        } => {
            let mut mapping = helper.mapping().clone();
            if let Some(field) = value_field {
                mapping = mapping.with_value(field);
            }
            if no_optgroup {
                mapping = mapping.without_optgroup();
            }

            let mut options = helper
                .build_options()
                .with_mapping(mapping)
                .with_selected(selected)
                .with_condition(filter.condition()?);
            for item in prepend {
                let (value, title) = item.split_once('=').unwrap_or((item.as_str(), ""));
                options = options.with_prepend(value, title);
            }

            let collection = helper
                .to_select(key.as_str(), &options)
                .with_context(|| format!("failed to build options for '{key}'"))?;
            collection.to_markup()
        }
        Commands::Keys {
            key,
            filter,
            single,
            random,
        } => {
            let condition = filter.condition()?;
            let keys = if random {
                vec![helper.random_key(key.as_str(), &condition)?]
            } else if single {
                helper
                    .key(key.as_str(), &condition, true)?
                    .into_iter()
                    .collect()
            } else {
                helper.keys(key.as_str(), &condition)?
            };
            Ok(keys.join("\n"))
        }
        Commands::Value { key, filter, path } => {
            let value = helper.value(&key, &filter.condition()?, path.as_deref(), true)?;
            Ok(serde_json::to_string(&value.unwrap_or(Value::Null))?)
        }
        Commands::Publish {
            key,
            visible,
            trans,
            filter,
        } => {
            let condition = filter.condition()?;
            let published = helper.publish(key.as_str(), &visible, &trans, &condition)?;
            Ok(serde_json::to_string_pretty(&published)?)
        }
    }
}
