//! End-to-end tests of the uncomment operation over the in-memory system

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use clap::Parser as _;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::path::{Path, PathBuf};
    use valuegraft::cli::Args;
    use valuegraft::config::Options;
    use valuegraft::error::GraftError;
    use valuegraft::operations::pipeline::{Inputs, UncommentOperation};
    use valuegraft::operations::repair::RepairStrategy;
    use valuegraft::system::System as _;
    use valuegraft::system::mock::MockSystem;

    const TEMPLATE: &str = "# Example values\nconfig:\n  # port: 8080\n  # host: example\n  # tls:\n  #   enabled: true\n  # madeUp: 1\n";

    fn chart_archive(values: &str) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(values.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, "app/values.yaml", values.as_bytes())
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn system() -> MockSystem {
        MockSystem::new()
            .with_file("/in/template.yaml", TEMPLATE.as_bytes())
            .unwrap()
            .with_file(
                "/in/charts/app-1.0.0.tgz",
                &chart_archive("config:\n  port: 80\n  host: x\n"),
            )
            .unwrap()
            .with_file(
                "/in/catalog.json",
                br#"[{ "path": "config.tls.enabled", "format": "boolean" }]"#,
            )
            .unwrap()
            .with_dir("/out")
            .unwrap()
    }

    fn inputs() -> Inputs {
        Inputs {
            template: PathBuf::from("/in/template.yaml"),
            charts: Some(PathBuf::from("/in/charts")),
            catalog: Some(PathBuf::from("/in/catalog.json")),
            output: Some(PathBuf::from("/out/values.yaml")),
            ..Inputs::default()
        }
    }

    fn exit_code(err: &anyhow::Error) -> i32 {
        err.downcast_ref::<GraftError>().unwrap().exit_code()
    }

    #[test]
    fn charts_and_catalog_drive_the_transformation() {
        let system = system();
        let operation = UncommentOperation::with_options(Options::default(), inputs(), &system);
        let outcome = operation.execute().unwrap();

        assert_eq!(
            outcome.document,
            "# Example values\nconfig:\n  port: 8080\n  host: example\n  tls:\n    enabled: true\n  # madeUp: 1\n"
        );

        let summary = outcome.summary;
        assert!(summary.is_clean());
        assert_eq!(summary.lines_classified, 7);
        assert_eq!(summary.documentation_lines, 1);
        assert_eq!(summary.active_data_lines, 1);
        assert_eq!(summary.inactive_data_lines, 5);
        assert_eq!(summary.lines_uncommented, 4);
        assert_eq!(summary.inactive_unmatched, 1);
        assert_eq!(summary.archives_processed, 1);
        assert_eq!(summary.values_parsed, 1);
        assert_eq!(summary.catalog_records_ingested, 1);
        assert_eq!(summary.lint_errors, 0);
    }

    #[test]
    fn outputs_are_written_through_the_system() {
        let system = system();
        let mut inputs = inputs();
        inputs.report = Some(PathBuf::from("/out/reports/run.json"));
        let operation = UncommentOperation::with_options(Options::default(), inputs, &system);
        let outcome = operation.execute().unwrap();
        operation.write_outputs(&outcome).unwrap();

        let written = system.read_to_string(Path::new("/out/values.yaml")).unwrap();
        assert_eq!(written, outcome.document);

        let report: serde_json::Value =
            serde_json::from_str(&system.read_to_string(Path::new("/out/reports/run.json")).unwrap())
                .unwrap();
        assert_eq!(report["summary"]["lines_uncommented"], 4);
        assert!(report["lint"].as_array().unwrap().is_empty());
        assert!(
            report["diagnostics"]
                .as_array()
                .unwrap()
                .iter()
                .any(|d| d["rule"] == "template.inactive-unmatched")
        );
    }

    #[test]
    fn missing_template_is_an_input_error() {
        let system = MockSystem::new();
        let inputs = Inputs {
            template: PathBuf::from("/missing.yaml"),
            ..Inputs::default()
        };
        let operation = UncommentOperation::with_options(Options::default(), inputs, &system);

        let err = operation.execute().unwrap_err();
        assert_eq!(exit_code(&err), 2);
        assert!(err.to_string().contains("Failed to read template"));
    }

    #[test]
    fn unwritable_output_is_an_output_error() {
        let system = system();
        let mut inputs = inputs();
        inputs.output = Some(PathBuf::from("/nowhere/values.yaml"));
        let operation = UncommentOperation::with_options(Options::default(), inputs, &system);
        let outcome = operation.execute().unwrap();

        let err = operation.write_outputs(&outcome).unwrap_err();
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn runs_without_model_sources() {
        let system = MockSystem::new()
            .with_file("/t.yaml", b"config:\n  # port: 1\n")
            .unwrap();
        let inputs = Inputs {
            template: PathBuf::from("/t.yaml"),
            ..Inputs::default()
        };
        let outcome = UncommentOperation::with_options(Options::default(), inputs, &system)
            .execute()
            .unwrap();

        assert_eq!(outcome.document, "config:\n  # port: 1\n");
        assert_eq!(outcome.summary.lines_uncommented, 0);
        assert_eq!(outcome.summary.inactive_unmatched, 1);
    }

    fn misindented_system() -> MockSystem {
        MockSystem::new()
            .with_file("/t.yaml", b"a:\n    b: 1\n#  c: 2\n")
            .unwrap()
            .with_file(
                "/charts/app.tgz",
                &chart_archive("a:\n  b: 1\n  c: 2\n"),
            )
            .unwrap()
    }

    fn misindented_inputs() -> Inputs {
        Inputs {
            template: PathBuf::from("/t.yaml"),
            charts: Some(PathBuf::from("/charts")),
            ..Inputs::default()
        }
    }

    #[test]
    fn report_strategy_keeps_lint_errors() {
        let system = misindented_system();
        let outcome = UncommentOperation::with_options(Options::default(), misindented_inputs(), &system)
            .execute()
            .unwrap();

        assert_eq!(outcome.document, "a:\n    b: 1\n  c: 2\n");
        assert_eq!(outcome.summary.lint_errors, 1);
        assert_eq!(outcome.summary.repair_passes, 0);
        assert!(!outcome.summary.is_clean());
        assert_eq!(outcome.lint.len(), 1);
        assert_eq!(outcome.lint[0].rule, "syntax");
        assert_eq!(outcome.lint[0].line, 3);
    }

    #[test]
    fn revert_strategy_restores_offending_lines() {
        let system = misindented_system();
        let mut options = Options::default();
        options.repair_strategy = RepairStrategy::Revert;
        let outcome = UncommentOperation::with_options(options, misindented_inputs(), &system)
            .execute()
            .unwrap();

        assert_eq!(outcome.document, "a:\n    b: 1\n#  c: 2\n");
        assert!(outcome.summary.is_clean());
        assert_eq!(outcome.summary.lines_reverted, 1);
        assert_eq!(outcome.summary.lines_uncommented, 0);
        assert_eq!(outcome.summary.repair_passes, 1);
        assert!(outcome.diagnostics.iter().any(|d| d.rule == "lint.reverted"));
    }

    #[test]
    fn zero_repair_passes_never_reverts() {
        let system = misindented_system();
        let mut options = Options::default();
        options.repair_strategy = RepairStrategy::Revert;
        options.repair_passes = 0;
        let outcome = UncommentOperation::with_options(options, misindented_inputs(), &system)
            .execute()
            .unwrap();

        assert_eq!(outcome.summary.lines_reverted, 0);
        assert_eq!(outcome.summary.lint_errors, 1);
    }

    #[test]
    fn command_line_overrides_the_options_file() {
        let system = MockSystem::new()
            .with_file("/opts.yaml", b"indent_step: 3\nrepair_strategy: revert\n")
            .unwrap();
        let args = Args::parse_from([
            "valuegraft",
            "--template",
            "/t.yaml",
            "--config",
            "/opts.yaml",
            "--indent-step",
            "4",
            "--no-cascade",
        ]);

        let operation = UncommentOperation::new(&args, &system).unwrap();
        let options = operation.options();
        assert_eq!(options.indent_step, 4);
        assert_eq!(options.repair_strategy, RepairStrategy::Revert);
        assert!(!options.force_uncomment_cascade);
    }

    #[test]
    fn invalid_override_is_a_configuration_error() {
        let system = MockSystem::new();
        let args = Args::parse_from(["valuegraft", "--template", "/t.yaml", "--indent-step", "0"]);

        let err = UncommentOperation::new(&args, &system).err().unwrap();
        assert_eq!(exit_code(&err), 1);
    }
}
