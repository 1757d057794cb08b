//! Unit tests for the structure model

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use valuegraft::diagnostics::Diagnostics;
    use valuegraft::keypath::ParamPath;
    use valuegraft::model::catalog::entries_from_records;
    use valuegraft::model::structure::{Source, StructureModel};
    use valuegraft::model::value::DocValue;

    fn chart_model(values: &str) -> StructureModel {
        let doc = DocValue::from(serde_yaml::from_str::<serde_yaml::Value>(values).unwrap());
        let mut model = StructureModel::new();
        model.ingest_document(&doc, Source::Chart);
        model
    }

    fn add_catalog(model: &mut StructureModel, records: serde_json::Value) -> usize {
        let serde_json::Value::Array(records) = records else {
            panic!("expected an array");
        };
        let mut diagnostics = Diagnostics::new();
        let (entries, _) = entries_from_records(records, &mut diagnostics);
        model.ingest_catalog(&entries)
    }

    #[test]
    fn resolves_chart_paths_with_depths_and_types() {
        let model = chart_model("config:\n  port: 8080\n  hosts:\n    - name: a\n");

        let port = model.resolve(&ParamPath::parse("config.port")).unwrap();
        assert_eq!(model.node(port).depth(), 2);
        assert_eq!(model.node(port).data_type(), Some("integer"));

        let name = model.resolve(&ParamPath::parse("config.hosts[3].name")).unwrap();
        assert_eq!(model.node(name).depth(), 4);

        let hosts = model.resolve(&ParamPath::parse("config.hosts")).unwrap();
        assert_eq!(model.node(hosts).data_type(), Some("sequence"));
        assert!(model.node(hosts).has_children());

        assert!(model.resolve(&ParamPath::parse("config.missing")).is_none());
    }

    #[test]
    fn dynamic_child_catches_unknown_names() {
        let mut model = StructureModel::new();
        add_catalog(
            &mut model,
            serde_json::json!([{ "path": "services.{{ .name }}.port" }]),
        );

        assert!(model.resolve(&ParamPath::parse("services.web.port")).is_some());
        assert!(model.resolve(&ParamPath::parse("services.db.port")).is_some());
        assert!(model.resolve(&ParamPath::parse("services.web.host")).is_none());
    }

    #[test]
    fn catalog_metadata_lands_on_terminal_node() {
        let mut model = chart_model("config:\n  port: 1\n");
        let ingested = add_catalog(
            &mut model,
            serde_json::json!([
                { "path": "config.port", "mandatory": "yes", "description": "Listen port", "owner": "net" },
                { "path": "config.tls.enabled", "format": "boolean" }
            ]),
        );
        assert_eq!(ingested, 2);

        let port = model.node(model.resolve(&ParamPath::parse("config.port")).unwrap());
        assert_eq!(port.source(), Some(Source::Both));
        assert_eq!(port.description(), Some("Listen port"));
        let metadata = port.metadata().unwrap();
        assert_eq!(metadata.mandatory, Some(true));
        assert_eq!(metadata.extra["owner"], serde_json::json!("net"));

        let tls = model.node(model.resolve(&ParamPath::parse("config.tls")).unwrap());
        assert_eq!(tls.source(), Some(Source::Catalog));
        assert_eq!(tls.data_type(), Some("mapping"));
    }

    #[test]
    fn special_tokens_resolve_by_exact_name() {
        let mut model = StructureModel::new();
        add_catalog(&mut model, serde_json::json!([{ "path": r#"abecadlo."abc.def.ghi/jkl""# }]));

        let node = model
            .resolve(&ParamPath::parse(r#"abecadlo."abc.def.ghi/jkl""#))
            .unwrap();
        assert_eq!(model.node(node).name(), "abc.def.ghi/jkl");
    }

    #[test]
    fn every_sampled_path_resolves() {
        let mut model = chart_model("a:\n  b: 1\n  list:\n    - x: 1\n      y: [1, 2]\nc: true\n");
        add_catalog(
            &mut model,
            serde_json::json!([{ "path": r#"a."dotted.key""# }, { "path": "svc.{{ .n }}.port" }]),
        );

        let samples = model.trace_sample_paths(usize::MAX);
        assert_eq!(samples.len(), model.len() - 1);
        for path in samples {
            let reparsed = ParamPath::parse(&path.to_string());
            assert!(model.resolve(&reparsed).is_some(), "{path} does not resolve");
            assert_eq!(model.resolve(&reparsed), model.resolve(&path));
        }
    }

    #[test]
    fn sample_limit_is_honoured() {
        let model = chart_model("a: 1\nb: 2\nc: 3\n");
        let samples = model.trace_sample_paths(2);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].to_string(), "a");
    }
}
