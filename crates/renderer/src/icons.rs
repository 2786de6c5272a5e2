//! Bootstrap icons for well-known top-level menu sections.

/// Icon class for a menu node name, if it has one.
pub fn icon_for(name: &str) -> Option<&'static str> {
    let icon = match name {
        "Aerolevantamento" => "bi-airplane",
        "teste" => "bi-bug",
        "Imageamento" => "bi-camera",
        "Tributário" => "bi-currency-dollar",
        "Limites Administrativos" => "bi-bounding-box-circles",
        "Cartografia Base" => "bi-map",
        "Zoneamentos" => "bi-subtract",
        "Observatório do Mercado Imobiliário" => "bi-binoculars",
        "Uso Solo" => "bi-buildings",
        "IBGE" => "bi-compass",
        _ => return None,
    };
    Some(icon)
}

/// `<i>` element for a node name, or an empty string.
pub fn icon_html(name: &str) -> String {
    icon_for(name)
        .map(|class| format!(r#"<i class="bi {}"></i>"#, class))
        .unwrap_or_default()
}
