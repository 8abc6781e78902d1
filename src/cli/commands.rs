//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands, SchemaCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, OutputFormat, Settings};
use crate::domain::{output_tree, schema_tree, OutputNode};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::SchemaProvider;
use crate::infrastructure::InfraError;

pub async fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = resolve_project_dir(cli.project_dir.as_deref())?;
    debug!("project_dir: {}", project_dir.display());

    match &cli.command {
        Some(Commands::Extract {
            schema,
            record,
            relations,
            format,
        }) => {
            let container = build_container(&project_dir)?;
            cmd_extract(&container, schema, record, relations.as_deref(), *format).await
        }
        Some(Commands::Schema { command }) => {
            let container = build_container(&project_dir)?;
            match command {
                SchemaCommands::List => cmd_schema_list(&container),
                SchemaCommands::Show { name } => cmd_schema_show(&container, name),
            }
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(&project_dir),
            ConfigCommands::Path => cmd_config_path(&project_dir),
            ConfigCommands::Template => {
                output::info(&Settings::template());
                Ok(())
            }
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, run `sdata --help`".to_string(),
        )),
    }
}

fn resolve_project_dir(project_dir: Option<&Path>) -> CliResult<PathBuf> {
    match project_dir {
        Some(dir) if dir.is_dir() => Ok(dir.to_path_buf()),
        Some(dir) => Err(CliError::InvalidArgs(format!(
            "project directory does not exist: {}",
            dir.display()
        ))),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("resolve current directory", e).into()),
    }
}

fn build_container(project_dir: &Path) -> CliResult<ServiceContainer> {
    let settings = Settings::load(Some(project_dir))?;
    Ok(ServiceContainer::new(settings))
}

#[instrument(level = "debug", skip(container))]
async fn cmd_extract(
    container: &ServiceContainer,
    schema: &str,
    record_path: &Path,
    relations: Option<&Path>,
    format: Option<OutputFormat>,
) -> CliResult<()> {
    let record = container.load_record(record_path, relations)?;
    let service = container.structured_data();
    let nodes = service.get_data(schema, &record).await?;

    let format = format.unwrap_or(container.settings.output.format);
    let rendered = render(schema, &nodes, format, container.settings.output.pretty)?;
    output::info(&rendered);
    Ok(())
}

fn render(
    schema: &str,
    nodes: &[OutputNode],
    format: OutputFormat,
    pretty: bool,
) -> CliResult<String> {
    let rendered = match format {
        OutputFormat::Tree => output_tree(schema, nodes).to_string(),
        OutputFormat::Json if pretty => serde_json::to_string_pretty(nodes)
            .map_err(|e| InfraError::record("output", e))?,
        OutputFormat::Json => {
            serde_json::to_string(nodes).map_err(|e| InfraError::record("output", e))?
        }
    };
    Ok(rendered)
}

fn cmd_schema_list(container: &ServiceContainer) -> CliResult<()> {
    let store = container.schema_store();
    let names = store.list()?;
    if names.is_empty() {
        output::warning(&format!(
            "no schemas found in {}",
            store.schema_dir().display()
        ));
    }
    for name in names {
        output::info(&name);
    }
    Ok(())
}

fn cmd_schema_show(container: &ServiceContainer, name: &str) -> CliResult<()> {
    let store = container.schema_store();
    let path = store.locate(name)?;
    let schema = store.load(name)?;
    output::action("Schema", &path.display());
    output::info(&schema_tree(name, &schema));
    Ok(())
}

fn cmd_config_show(project_dir: &Path) -> CliResult<()> {
    let settings = Settings::load(Some(project_dir))?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path(project_dir: &Path) -> CliResult<()> {
    output::header("Config files (lowest to highest precedence)");
    match global_config_path() {
        Some(path) => output::detail(&describe_path("global", &path)),
        None => output::detail(&"global: <no config directory on this platform>"),
    }
    output::detail(&describe_path("local", &local_config_path(project_dir)));
    Ok(())
}

fn describe_path(kind: &str, path: &Path) -> String {
    let state = if path.exists() { "found" } else { "missing" };
    format!("{kind}: {} ({state})", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_nodes() -> Vec<OutputNode> {
        vec![OutputNode::Group {
            label: "Basics".into(),
            data: vec![OutputNode::Field {
                label: "Name".into(),
                value: Some(json!("Ada")),
                display: Some(json!("Ada")),
                path: Some("name".into()),
            }],
        }]
    }

    #[test]
    fn given_json_format_when_rendering_compact_then_emits_single_line() {
        let rendered = render("person", &sample_nodes(), OutputFormat::Json, false).unwrap();
        assert_eq!(
            rendered,
            r#"[{"type":"group","label":"Basics","data":[{"type":"field","label":"Name","value":"Ada","display":"Ada","path":"name"}]}]"#
        );
    }

    #[test]
    fn given_tree_format_when_rendering_then_emits_tree() {
        let rendered = render("person", &sample_nodes(), OutputFormat::Tree, true).unwrap();
        assert!(rendered.starts_with("person"));
        assert!(rendered.contains("Name: Ada"));
    }
}
