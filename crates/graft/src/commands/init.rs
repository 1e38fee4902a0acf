//! Initialize graft in a project.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use graft_bundle::{manifest_dir, Manifest};

/// Run the init command.
pub async fn run(manifest_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing graft...");

    let created = write_starter(manifest_path, yes)?;
    for path in &created {
        tracing::info!("Created {}", path.display());
    }

    if created.is_empty() {
        tracing::warn!("Nothing written. Use --yes to overwrite existing files.");
        return Ok(());
    }

    tracing::info!("Initialization complete!");
    if let Some(hint) = runtime_hint(&Manifest::load(manifest_path)?) {
        tracing::warn!("{}", hint);
    }
    tracing::info!("Run 'graft dev' to start the development server.");

    Ok(())
}

/// Elements call the runtime through globals; without a prelude nothing in the bundle
/// defines them.
fn runtime_hint(manifest: &Manifest) -> Option<String> {
    if !manifest.bundle.prelude.is_empty() || manifest.elements.is_empty() {
        return None;
    }
    Some(format!(
        "No [bundle] prelude: the page must define {} and {} before loading the bundle, \
         or list the runtime's UMD builds under [bundle] prelude in the manifest.",
        manifest.runtime.create_element, manifest.runtime.create_root
    ))
}

/// Write the starter manifest and components, skipping existing files unless `overwrite`.
fn write_starter(manifest_path: &Path, overwrite: bool) -> Result<Vec<PathBuf>> {
    let components_dir = manifest_dir(manifest_path).join("components");
    fs::create_dir_all(&components_dir).context("Failed to create components directory")?;

    let files = [
        (manifest_path.to_path_buf(), DEFAULT_MANIFEST),
        (components_dir.join("hello-card.js"), DEFAULT_HELLO_CARD),
        (components_dir.join("counter.js"), DEFAULT_COUNTER),
    ];

    let mut created = Vec::new();
    for (path, content) in files {
        if path.exists() && !overwrite {
            tracing::debug!("Skipping existing {}", path.display());
            continue;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        created.push(path);
    }

    Ok(created)
}

const DEFAULT_MANIFEST: &str = r#"# Graft manifest

[bundle]
# Bundle written by 'graft build'
output = "dist/elements.js"

# Scripts inlined first, e.g. UMD builds of the UI runtime.
# Without them the page must load the runtime before the bundle.
# prelude = ["vendor/react.production.min.js", "vendor/react-dom.production.min.js"]

# Every .js file here is inlined as a component source
components_dir = "components"

[runtime]
create_element = "React.createElement"
create_root = "ReactDOM.createRoot"
strict_mode = "React.StrictMode"
strict = true

[[element]]
tag = "x-hello-card"
component = "HelloCard"
props = { name = "string" }
demo = { name = "Ada" }

[[element]]
tag = "x-counter"
component = "Counter"
shadow = "open"
props = { start = "number", step = "number" }
events = { onChange = "change" }
demo = { start = "10", step = "5" }
"#;

const DEFAULT_HELLO_CARD: &str = r#"function HelloCard(props) {
  return React.createElement('p', null, 'Hello, ' + (props.name ?? 'world') + '!');
}
"#;

const DEFAULT_COUNTER: &str = r#"function Counter(props) {
  const [count, setCount] = React.useState(props.start ?? 0);
  const step = props.step ?? 1;

  return React.createElement(
    'button',
    {
      onClick: () => {
        const next = count + step;
        setCount(next);
        if (props.onChange) props.onChange(next);
      },
    },
    'Count: ' + count
  );
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use graft_bundle::Bundler;
    use tempfile::tempdir;

    #[test]
    fn starter_project_bundles() {
        let temp = tempdir().unwrap();
        let manifest_path = temp.path().join("graft.toml");

        let created = write_starter(&manifest_path, false).unwrap();
        assert_eq!(created.len(), 3);

        let manifest = Manifest::load(&manifest_path).unwrap();
        let output = Bundler::new(temp.path()).bundle(&manifest).unwrap();
        assert_eq!(output.elements.len(), 2);
        assert!(output.script.contains("function Counter(props)"));
    }

    #[test]
    fn starter_manifest_warns_about_missing_runtime() {
        let temp = tempdir().unwrap();
        let manifest_path = temp.path().join("graft.toml");
        write_starter(&manifest_path, false).unwrap();

        let mut manifest = Manifest::load(&manifest_path).unwrap();
        let hint = runtime_hint(&manifest).unwrap();
        assert!(hint.contains("React.createElement"));
        assert!(hint.contains("ReactDOM.createRoot"));

        manifest.bundle.prelude.push(PathBuf::from("vendor/react.js"));
        assert!(runtime_hint(&manifest).is_none());
    }

    #[test]
    fn keeps_existing_files_without_overwrite() {
        let temp = tempdir().unwrap();
        let manifest_path = temp.path().join("graft.toml");
        fs::write(&manifest_path, "# mine\n").unwrap();

        let created = write_starter(&manifest_path, false).unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(fs::read_to_string(&manifest_path).unwrap(), "# mine\n");

        let created = write_starter(&manifest_path, true).unwrap();
        assert_eq!(created.len(), 3);
    }
}
