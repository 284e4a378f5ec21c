//! Cube document serialization
//!
//! Renders cubes as YAML or JSON and writes them either as one document or
//! one file per cube.

use std::path::{Path, PathBuf};
use lkml2cube_core::{Cube, CubeDocument, OutputConfig, OutputFormat, OutputLayout};

/// Serialization errors
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cube name '{0}' cannot be used as a file name")]
    InvalidFileName(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Render cubes as a single document
pub fn render(cubes: &[Cube], format: OutputFormat) -> Result<String, EmitError> {
    let document = CubeDocument { cubes: cubes.to_vec() };

    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&document)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&document)?;
            json.push('\n');
            json
        }
    };

    Ok(rendered)
}

fn write_file(path: &Path, contents: &str) -> Result<(), EmitError> {
    let io_error = |source| EmitError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, contents).map_err(io_error)
}

/// File stem for a cube; must stay a single path component
fn file_stem(name: &str) -> Result<&str, EmitError> {
    let separator = |c: char| matches!(c, '/' | '\\' | '\0');
    if name.is_empty() || name == "." || name == ".." || name.contains(separator) {
        return Err(EmitError::InvalidFileName(name.to_string()));
    }
    Ok(name)
}

/// Write cubes according to the output settings
///
/// Returns the paths written, in cube order.
pub fn write_files(cubes: &[Cube], output: &OutputConfig) -> Result<Vec<PathBuf>, EmitError> {
    let extension = output.format.extension();
    let mut written = Vec::new();

    match output.layout {
        OutputLayout::Single => {
            let path = output.dir.join(format!("cubes.{}", extension));
            write_file(&path, &render(cubes, output.format)?)?;
            written.push(path);
        }
        OutputLayout::PerCube => {
            let dir = output.dir.join("cubes");
            let paths = cubes
                .iter()
                .map(|cube| Ok(dir.join(format!("{}.{}", file_stem(&cube.name)?, extension))))
                .collect::<Result<Vec<_>, EmitError>>()?;

            for (cube, path) in cubes.iter().zip(paths) {
                write_file(&path, &render(std::slice::from_ref(cube), output.format)?)?;
                written.push(path);
            }
        }
    }

    for path in &written {
        tracing::debug!("Wrote {}", path.display());
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lkml2cube_core::{CubeJoin, Relationship};
    use pretty_assertions::assert_eq;

    fn cubes() -> Vec<Cube> {
        let mut orders = Cube::new("orders");
        orders.sql_table = Some("public.orders".to_string());
        orders.joins.push(CubeJoin {
            name: "customers".to_string(),
            sql: "${orders.customer_id} = ${customers.id}".to_string(),
            relationship: Relationship::OneToMany,
        });

        let mut customers = Cube::new("customers");
        customers.sql = Some("SELECT * FROM customers".to_string());

        vec![orders, customers]
    }

    #[test]
    fn yaml_rendering() {
        let yaml = render(&cubes(), OutputFormat::Yaml).unwrap();
        assert!(yaml.starts_with("cubes:"));
        assert!(yaml.contains("relationship: one_to_many"));
        assert!(yaml.contains("sql_table: public.orders"));

        let parsed: CubeDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.cubes, cubes());
    }

    #[test]
    fn json_rendering() {
        let json = render(&cubes(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["cubes"][1]["sql"], "SELECT * FROM customers");
        assert!(value["cubes"][1].get("joins").is_none());
    }

    #[test]
    fn one_file_per_cube() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            dir: dir.path().to_path_buf(),
            format: OutputFormat::Yaml,
            layout: OutputLayout::PerCube,
        };

        let written = write_files(&cubes(), &output).unwrap();
        assert_eq!(
            written,
            vec![
                dir.path().join("cubes").join("orders.yml"),
                dir.path().join("cubes").join("customers.yml"),
            ]
        );

        let contents = std::fs::read_to_string(&written[1]).unwrap();
        let parsed: CubeDocument = serde_yaml::from_str(&contents).unwrap();
        assert_eq!(parsed.cubes.len(), 1);
        assert_eq!(parsed.cubes[0].name, "customers");
    }

    #[test]
    fn cube_names_cannot_escape_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            dir: dir.path().join("out"),
            format: OutputFormat::Yaml,
            layout: OutputLayout::PerCube,
        };

        for name in ["../escape", "nested/orders", "..", "a\\b"] {
            let mut cube = Cube::new(name);
            cube.sql_table = Some("t".to_string());

            let result = write_files(&[cube], &output);
            assert!(
                matches!(result, Err(EmitError::InvalidFileName(ref n)) if n == name),
                "{} was accepted",
                name
            );
        }
        assert!(!dir.path().join("escape.yml").exists());

        // Nothing is written when any name is rejected
        let mut valid = Cube::new("orders");
        valid.sql_table = Some("t".to_string());
        let mut invalid = Cube::new("../orders");
        invalid.sql_table = Some("t".to_string());
        assert!(write_files(&[valid, invalid], &output).is_err());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn single_document() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            dir: dir.path().join("out"),
            format: OutputFormat::Json,
            layout: OutputLayout::Single,
        };

        let written = write_files(&cubes(), &output).unwrap();
        assert_eq!(written, vec![dir.path().join("out").join("cubes.json")]);
        assert!(written[0].exists());
    }
}
