//! Unit tests for uncomment decisions and emission

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use valuegraft::config::Options;
    use valuegraft::diagnostics::Diagnostics;
    use valuegraft::model::catalog::entries_from_records;
    use valuegraft::model::structure::{Source, StructureModel};
    use valuegraft::model::value::DocValue;
    use valuegraft::operations::emit::emit;
    use valuegraft::operations::uncomment::{DecisionStats, UncommentDecider};
    use valuegraft::template::classifier::TemplateClassifier;
    use valuegraft::template::line::Classification;

    fn model(values: &str, catalog: serde_json::Value) -> StructureModel {
        let mut model = StructureModel::new();
        let doc = DocValue::from(serde_yaml::from_str::<serde_yaml::Value>(values).unwrap());
        model.ingest_document(&doc, Source::Chart);
        let serde_json::Value::Array(records) = catalog else {
            panic!("expected an array");
        };
        let mut diagnostics = Diagnostics::new();
        let (entries, _) = entries_from_records(records, &mut diagnostics);
        model.ingest_catalog(&entries);
        model
    }

    fn transform(model: &StructureModel, options: &Options, template: &str) -> (String, DecisionStats) {
        let mut diagnostics = Diagnostics::new();
        let lines = TemplateClassifier::new(model, options)
            .unwrap()
            .classify(template, &mut diagnostics);
        let (decided, stats) = UncommentDecider::new(model, options).decide(&lines, &mut diagnostics);
        assert_eq!(decided.len(), lines.len());
        (emit(&decided), stats)
    }

    fn nice_object_model() -> StructureModel {
        model(
            "{}",
            serde_json::json!([
                { "path": "something.niceObject.child111" },
                { "path": "something.niceObject.child222" }
            ]),
        )
    }

    #[test]
    fn recognised_leaf_is_uncommented_at_model_indent() {
        let model = model("{}", serde_json::json!([{ "path": "config.port", "format": "integer" }]));
        let (output, stats) = transform(&model, &Options::default(), "config:\n  # port: 8080\n");

        assert_eq!(output, "config:\n  port: 8080\n");
        assert_eq!(stats.uncommented, 1);
    }

    #[test]
    fn container_cascade_reindents_children() {
        let (output, stats) = transform(
            &nice_object_model(),
            &Options::default(),
            "something:\n#niceObject:\n#  child111: 90909\n#  child222: true\n",
        );

        assert_eq!(
            output,
            "something:\n  niceObject:\n    child111: 90909\n    child222: true\n"
        );
        assert_eq!(stats.uncommented, 3);
    }

    #[test]
    fn cascade_uncommented_unknown_children_and_stops_at_dedent() {
        let model = model("something:\n  niceObject:\n    known: 1\n", serde_json::json!([]));
        let template = "something:\n#niceObject:\n#  child111: 90909\n#    deeper: 1\n#  known: 2\n# Some prose here\nother: 1\n# stray: 3\n";

        let (output, stats) = transform(&model, &Options::default(), template);
        assert_eq!(
            output,
            "something:\n  niceObject:\n    child111: 90909\n      deeper: 1\n    known: 2\n# Some prose here\nother: 1\n# stray: 3\n"
        );
        assert_eq!(stats.uncommented, 4);
        assert_eq!(stats.inactive_unmatched, 1);
    }

    #[test]
    fn without_cascade_only_resolved_keys_are_uncommented() {
        let model = model("something:\n  niceObject:\n    known: 1\n", serde_json::json!([]));
        let mut options = Options::default();
        options.force_uncomment_cascade = false;

        let (output, stats) = transform(
            &model,
            &options,
            "something:\n#niceObject:\n#  child111: 90909\n#  known: 2\n",
        );
        assert_eq!(
            output,
            "something:\n  niceObject:\n#  child111: 90909\n    known: 2\n"
        );
        assert_eq!(stats.inactive_unmatched, 1);
    }

    #[test]
    fn non_inactive_lines_are_emitted_unchanged() {
        let model = model("config:\n  port: 1\n", serde_json::json!([]));
        let template = "# Documentation line\n\n# mandatory: must be set\n# mandatory field\nconfig:\n   port: 1   \n  # port: 2\n";
        let mut diagnostics = Diagnostics::new();
        let options = Options::default();
        let lines = TemplateClassifier::new(&model, &options)
            .unwrap()
            .classify(template, &mut diagnostics);
        let (decided, stats) = UncommentDecider::new(&model, &options).decide(&lines, &mut diagnostics);

        for (line, out) in lines.iter().zip(&decided) {
            assert_eq!(line.line_no, out.line_no);
            if line.classification != Classification::InactiveData {
                assert_eq!(out.text, line.body());
                assert!(!out.uncommented);
            }
        }
        assert_eq!(stats.constraints_seen, 1);
    }

    #[test]
    fn every_template_line_maps_to_one_output_line_in_order() {
        let template = "# Vendor values\n\nsomething:\n#niceObject:\n#    child111: 90909\n#    child222: true\n\n# Do not change below\nother: 1\n#   unknown: 2\n";
        let model = nice_object_model();
        let options = Options::default();
        let mut diagnostics = Diagnostics::new();
        let lines = TemplateClassifier::new(&model, &options)
            .unwrap()
            .classify(template, &mut diagnostics);
        let (decided, stats) = UncommentDecider::new(&model, &options).decide(&lines, &mut diagnostics);

        assert_eq!(lines.len(), 10);
        assert_eq!(decided.len(), lines.len());
        for (index, (line, out)) in lines.iter().zip(&decided).enumerate() {
            assert_eq!(out.line_no, index + 1);
            assert_eq!(out.line_no, line.line_no);
            assert_eq!(out.original, line.body());
            assert_eq!(out.terminator, line.terminator());
            if line.classification != Classification::InactiveData || !out.uncommented {
                assert_eq!(out.text, line.body(), "line {} changed", line.line_no);
            }
        }
        assert!(decided[4].uncommented);
        assert!(decided[5].uncommented);
        assert!(!decided[9].uncommented);

        assert_eq!(
            emit(&decided),
            "# Vendor values\n\nsomething:\n  niceObject:\n    child111: 90909\n    child222: true\n\n# Do not change below\nother: 1\n#   unknown: 2\n"
        );
        assert_eq!(stats.uncommented, 3);
        assert_eq!(stats.constraints_seen, 1);
        assert_eq!(stats.inactive_unmatched, 1);
    }

    #[test]
    fn unresolved_key_is_left_alone() {
        let model = StructureModel::new();
        let mut diagnostics = Diagnostics::new();
        let options = Options::default();
        let lines = TemplateClassifier::new(&model, &options)
            .unwrap()
            .classify("  # nonexistent: 42\n", &mut diagnostics);
        let (decided, stats) = UncommentDecider::new(&model, &options).decide(&lines, &mut diagnostics);

        assert_eq!(emit(&decided), "  # nonexistent: 42\n");
        assert_eq!(stats.inactive_unmatched, 1);
        assert_eq!(diagnostics.count("template.inactive-unmatched"), 1);
    }

    #[test]
    fn uncommented_indents_are_multiples_of_the_step() {
        let model = model(
            "a:\n  b:\n    c: 1\n    list:\n      - x: 1\n        y: 2\n",
            serde_json::json!([]),
        );
        let mut options = Options::default();
        options.indent_step = 4;
        let template = "a:\n #b:\n #   c: 3\n #   list:\n #     - x: 5\n #       y: 6\n #       unknown: 7\n";

        let mut diagnostics = Diagnostics::new();
        let lines = TemplateClassifier::new(&model, &options)
            .unwrap()
            .classify(template, &mut diagnostics);
        let (decided, _) = UncommentDecider::new(&model, &options).decide(&lines, &mut diagnostics);

        for out in decided.iter().filter(|out| out.uncommented) {
            let indent = out.text.len() - out.text.trim_start().len();
            assert_eq!(indent % options.indent_step, 0, "{:?}", out.text);
            assert!(!out.text.trim_start().starts_with('#'));
        }
        assert_eq!(decided[1].text, "    b:");
        assert_eq!(decided[2].text, "        c: 3");
        assert_eq!(decided[4].text, "            -   x: 5");
        assert_eq!(decided[5].text, "                y: 6");
        assert_eq!(decided[6].text, "                unknown: 7");
    }

    #[test]
    fn line_terminators_survive_and_final_newline_is_added() {
        let model = model("config:\n  port: 1\n", serde_json::json!([]));
        let (output, _) = transform(&model, &Options::default(), "config:\r\n  # port: 8080");
        assert_eq!(output, "config:\r\n  port: 8080\n");
    }

    #[test]
    fn empty_template_gives_empty_output() {
        let (output, stats) = transform(&StructureModel::new(), &Options::default(), "");
        assert_eq!(output, "");
        assert_eq!(stats, DecisionStats::default());
    }
}
