use super::Host;
use super::config::{Config, DEFAULT_CONFIG_FILE};
use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `flow-watch.toml`)
    #[arg(value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    let base_dir = Utf8Path::new(".");
    let config_path = args.config.as_ref();

    match Config::load(base_dir, config_path) {
        Ok(config) => {
            let _ = writeln!(host.output(), "Configuration file is valid");
            if let Some(path) = config_path {
                let _ = writeln!(host.output(), "Config file: {path}");
            } else if base_dir.join(DEFAULT_CONFIG_FILE).exists() {
                let _ = writeln!(host.output(), "Config file: {DEFAULT_CONFIG_FILE}");
            } else {
                let _ = writeln!(host.output(), "Using default configuration (no config file found)");
            }

            let _ = writeln!(
                host.output(),
                "Polling {} every {} for up to {} polls, {} stages",
                config.base_url,
                humantime_serde::re::humantime::format_duration(config.poll_interval),
                config.poll_ceiling,
                config.stages.len()
            );
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use crate::commands::init::{InitArgs, init_config};

    fn write_config(dir: &tempfile::TempDir, name: &str, text: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::try_from(dir.path().join(name)).unwrap();
        std::fs::write(&path, text).unwrap();
        path
    }

    fn error_text(result: Result<()>) -> String {
        format!("{:#}", result.unwrap_err())
    }

    #[test]
    fn test_default_config_is_valid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().join("generated.toml")).unwrap();

        let mut init_host = TestHost::new();
        let init_args = InitArgs {
            output: Some(config_path.clone()),
            force: false,
        };
        init_config(&mut init_host, &init_args).unwrap();

        let mut host = TestHost::new();
        let args = ValidateArgs { config: Some(config_path) };
        validate_config(&mut host, &args).unwrap();

        let output = host.output_text();
        assert!(output.contains("Configuration file is valid"));
        assert!(output.contains("9 stages"));
    }

    #[test]
    fn test_default_config_matches_embedded() {
        let default_config = Config::default();
        let parsed_config: Config = toml::from_str(super::super::config::DEFAULT_CONFIG_TOML).unwrap();

        let default_toml = toml::to_string(&default_config).unwrap();
        let parsed_toml = toml::to_string(&parsed_config).unwrap();

        assert_eq!(default_toml, parsed_toml, "Config::default() should match parsing DEFAULT_CONFIG_TOML");
    }

    #[test]
    fn test_invalid_toml_syntax() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = write_config(
            &temp_dir,
            "invalid_syntax.toml",
            r#"
# Missing closing bracket
[[stages]
threshold = 0
message = "Starting"
"#,
        );

        let mut host = TestHost::new();
        let args = ValidateArgs { config: Some(config_path) };
        let message = error_text(validate_config(&mut host, &args));

        assert!(message.contains("parsing configuration file"), "{message}");
        assert!(host.error_text().contains("Configuration validation failed"));
    }

    #[test]
    fn test_unknown_field() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = write_config(&temp_dir, "unknown_field.toml", "poll_ceiling = 10\nunknown_field = \"value\"\n");

        let mut host = TestHost::new();
        let args = ValidateArgs { config: Some(config_path) };
        let message = error_text(validate_config(&mut host, &args));

        assert!(message.contains("parsing configuration file"), "{message}");
    }

    #[test]
    fn test_invalid_duration_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = write_config(&temp_dir, "invalid_duration.toml", "poll_interval = \"not a valid duration\"\n");

        let mut host = TestHost::new();
        let args = ValidateArgs { config: Some(config_path) };
        assert!(validate_config(&mut host, &args).is_err());
    }

    #[test]
    fn test_descending_stage_thresholds() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = write_config(
            &temp_dir,
            "descending.toml",
            r#"
[[stages]]
threshold = 40
message = "Later"

[[stages]]
threshold = 20
message = "Earlier"
"#,
        );

        let mut host = TestHost::new();
        let args = ValidateArgs { config: Some(config_path) };
        assert!(validate_config(&mut host, &args).is_err());
    }

    #[test]
    fn test_zero_poll_ceiling() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = write_config(&temp_dir, "zero_ceiling.toml", "poll_ceiling = 0\n");

        let mut host = TestHost::new();
        let args = ValidateArgs { config: Some(config_path) };
        let message = error_text(validate_config(&mut host, &args));

        assert!(message.contains("validating configuration file"), "{message}");
    }

    #[test]
    fn test_empty_config_is_valid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = write_config(&temp_dir, "empty.toml", "# Empty config file\n");

        let mut host = TestHost::new();
        let args = ValidateArgs { config: Some(config_path) };
        validate_config(&mut host, &args).unwrap();
    }

    #[test]
    fn test_config_with_only_timings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = write_config(
            &temp_dir,
            "only_timings.toml",
            r#"
poll_interval = "1s"
settle_delay = "500ms"
request_timeout = "10s"
"#,
        );

        let mut host = TestHost::new();
        let args = ValidateArgs { config: Some(config_path) };
        validate_config(&mut host, &args).unwrap();

        let output = host.output_text();
        assert!(output.contains("every 1s"), "{output}");
    }
}
