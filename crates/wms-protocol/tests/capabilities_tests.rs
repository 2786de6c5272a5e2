//! Capabilities parsing and menu tree tests against realistic documents.

use test_utils::fixtures::{MUNICIPAL_CATALOG, SINGLE_ZONE_LAYER, TRUNCATED, WMS_111_CATALOG};
use test_utils::{capabilities_document, deep_menu_keyword, LayerSpec};
use wms_common::{MenuPlacement, ViewerError};
use wms_protocol::{parse_layers, process_capabilities};

// ============================================================================
// Tree shape
// ============================================================================

#[test]
fn test_single_zone_layer() {
    let tree = process_capabilities(SINGLE_ZONE_LAYER, MenuPlacement::First).unwrap();
    let node = tree.find(&["Zoneamentos"]).expect("Zoneamentos node");
    assert_eq!(node.layers.len(), 1);
    assert_eq!(node.layers[0].name, "ZONE:A");
    assert_eq!(node.layers[0].title, "Zona A");
    assert_eq!(tree.layer_count(), 1);
}

#[test]
fn test_municipal_catalog_shape() {
    let tree = process_capabilities(MUNICIPAL_CATALOG, MenuPlacement::First).unwrap();

    let top: Vec<_> = tree.children.keys().map(String::as_str).collect();
    assert_eq!(top, vec!["Cartografia Base", "Uso Solo", "Zoneamentos"]);

    let base = tree.find(&["Cartografia Base"]).unwrap();
    assert_eq!(base.layers[0].name, "CARTOGRAFIA:bairros");
    let lotes = tree.find(&["Cartografia Base", "Lotes"]).unwrap();
    assert_eq!(lotes.layers[0].name, "CARTOGRAFIA:quadras");

    assert_eq!(tree.node_count(), 4);
    assert_eq!(tree.layer_count(), 4);
}

#[test]
fn test_layer_without_menu_keyword_is_not_in_tree() {
    let tree = process_capabilities(MUNICIPAL_CATALOG, MenuPlacement::First).unwrap();
    assert!(!tree.contains_layer("LIMITES_ADMINISTRATIVOS:limite_municipal"));

    // ...but it was still parsed.
    let layers = parse_layers(MUNICIPAL_CATALOG).unwrap();
    assert!(layers
        .iter()
        .any(|l| l.record.name == "LIMITES_ADMINISTRATIVOS:limite_municipal"));
}

#[test]
fn test_record_sentinels() {
    let tree = process_capabilities(MUNICIPAL_CATALOG, MenuPlacement::First).unwrap();

    let bairros = tree.find_layer("CARTOGRAFIA:bairros").unwrap();
    assert_eq!(bairros.abstract_or_default(), "Limites dos bairros");
    assert_eq!(bairros.data_url_or_sentinel(), "semData");
    assert_eq!(bairros.metadata_url_or_default(), "N/A");

    let uso = tree.find_layer("USO:uso_solo_2020").unwrap();
    assert_eq!(uso.data_url_or_sentinel(), "https://dados.example.org/uso_solo_2020.zip");
    assert_eq!(
        uso.metadata_url_or_default(),
        "https://metadados.example.org/uso_solo_2020.xml"
    );
    assert_eq!(uso.abstract_or_default(), "N/A");
}

#[test]
fn test_wms_111_document() {
    let tree = process_capabilities(WMS_111_CATALOG, MenuPlacement::First).unwrap();
    let node = tree.find(&["IBGE", "Censo 2010"]).unwrap();
    assert_eq!(node.layers[0].title, "Setores Censitários");
}

#[test]
fn test_menu_a_b_property_over_generated_documents() {
    let paths = [
        vec!["a"],
        vec!["a", "b"],
        vec!["Limites Administrativos", "Bairros", "2023"],
    ];
    for path in paths {
        let keyword = format!("menu_{}", path.join("_"));
        let xml = capabilities_document(&[
            LayerSpec::new("ws:target", "Target").keyword("other").keyword(&keyword),
            LayerSpec::new("ws:hidden", "Hidden").keyword("features"),
        ]);
        let tree = process_capabilities(&xml, MenuPlacement::First).unwrap();
        let node = tree.find(&path).unwrap_or_else(|| panic!("missing node for {:?}", path));
        assert!(node.contains_layer("ws:target"));
        assert!(!tree.contains_layer("ws:hidden"));
    }
}

#[test]
fn test_deep_menu_path() {
    let keyword = deep_menu_keyword(15);
    let xml = capabilities_document(&[LayerSpec::new("deep", "Deep").keyword(&keyword)]);
    let tree = process_capabilities(&xml, MenuPlacement::First).unwrap();
    let path: Vec<String> = (0..15).map(|i| format!("l{}", i)).collect();
    assert!(tree.find(&path).unwrap().contains_layer("deep"));
}

#[test]
fn test_many_layers_share_node_in_document_order() {
    let specs: Vec<LayerSpec> = (0..5)
        .map(|i| LayerSpec::new(&format!("ws:l{}", i), &format!("Layer {}", i)).keyword("menu_Shared"))
        .collect();
    let tree = process_capabilities(&capabilities_document(&specs), MenuPlacement::First).unwrap();
    let names: Vec<_> = tree.find(&["Shared"]).unwrap().layers.iter().map(|l| l.name.clone()).collect();
    assert_eq!(names, vec!["ws:l0", "ws:l1", "ws:l2", "ws:l3", "ws:l4"]);
}

// ============================================================================
// Failure modes
// ============================================================================

#[test]
fn test_truncated_document_is_parse_error() {
    match process_capabilities(TRUNCATED, MenuPlacement::First) {
        Err(ViewerError::Parse(msg)) => assert!(msg.contains("end of document")),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_html_error_page_is_parse_error() {
    let html = "<html><body><p>Service Unavailable<br></body></html>";
    assert!(matches!(
        process_capabilities(html, MenuPlacement::First),
        Err(ViewerError::Parse(_))
    ));
}
