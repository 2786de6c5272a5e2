//! Common capabilities documents used across the viewer tests.
//!
//! The documents mirror what GeoServer publishes for a municipal catalog:
//! a root container layer, nested layers with `menu_*` keywords, style
//! blocks with their own Name/Title, and the optional metadata links.

/// One layer, one menu keyword.
pub const SINGLE_ZONE_LAYER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms" xmlns:xlink="http://www.w3.org/1999/xlink">
  <Service><Name>WMS</Name><Title>GeoServer Web Map Service</Title></Service>
  <Capability>
    <Layer>
      <Title>GeoServer Web Map Service</Title>
      <Abstract>A compliant implementation of WMS</Abstract>
      <Layer queryable="1" opaque="0">
        <Name>ZONE:A</Name>
        <Title>Zona A</Title>
        <KeywordList>
          <Keyword>features</Keyword>
          <Keyword>menu_Zoneamentos</Keyword>
        </KeywordList>
        <Style><Name>polygon</Name><Title>Default Polygon</Title></Style>
      </Layer>
    </Layer>
  </Capability>
</WMS_Capabilities>"#;

/// A small catalog exercising nesting, sentinels and hidden layers.
///
/// Tree (menu keywords):
/// - `Cartografia Base` → `Bairros` (data URL "null"), `Quadras` under `Lotes`
/// - `Zoneamentos` → `Zona A`
/// - `Uso Solo` → `Uso do Solo 2020` (concrete data URL, ISO metadata)
/// - `limite_municipal` has no menu keyword and stays out of the tree
pub const MUNICIPAL_CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms" xmlns:xlink="http://www.w3.org/1999/xlink">
  <Capability>
    <Layer>
      <Title>IDE Catalog</Title>
      <Layer queryable="1">
        <Name>CARTOGRAFIA:bairros</Name>
        <Title>Bairros</Title>
        <Abstract>Limites dos bairros</Abstract>
        <KeywordList><Keyword>menu_Cartografia Base</Keyword></KeywordList>
        <DataURL><Format>text/html</Format><OnlineResource xlink:type="simple" xlink:href="null"/></DataURL>
      </Layer>
      <Layer queryable="1">
        <Name>CARTOGRAFIA:quadras</Name>
        <Title>Quadras</Title>
        <KeywordList><Keyword>menu_Cartografia Base_Lotes</Keyword></KeywordList>
      </Layer>
      <Layer queryable="1">
        <Name>ZONE:A</Name>
        <Title>Zona A</Title>
        <KeywordList><Keyword>menu_Zoneamentos</Keyword></KeywordList>
      </Layer>
      <Layer queryable="1">
        <Name>USO:uso_solo_2020</Name>
        <Title>Uso do Solo 2020</Title>
        <KeywordList><Keyword>raster</Keyword><Keyword>menu_Uso Solo</Keyword></KeywordList>
        <MetadataURL type="ISO19115:2003">
          <Format>text/xml</Format>
          <OnlineResource xlink:type="simple" xlink:href="https://metadados.example.org/uso_solo_2020.xml"/>
        </MetadataURL>
        <DataURL>
          <Format>application/zip</Format>
          <OnlineResource xlink:type="simple" xlink:href="https://dados.example.org/uso_solo_2020.zip"/>
        </DataURL>
      </Layer>
      <Layer queryable="1">
        <Name>LIMITES_ADMINISTRATIVOS:limite_municipal</Name>
        <Title>Limite Municipal</Title>
        <KeywordList><Keyword>features</Keyword></KeywordList>
      </Layer>
    </Layer>
  </Capability>
</WMS_Capabilities>"#;

/// WMS 1.1.1 flavour (no default namespace, DOCTYPE present).
pub const WMS_111_CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE WMT_MS_Capabilities SYSTEM "http://schemas.opengis.net/wms/1.1.1/WMS_MS_Capabilities.dtd">
<WMT_MS_Capabilities version="1.1.1">
  <Capability>
    <Layer>
      <Title>Legacy</Title>
      <Layer>
        <Name>IBGE:setores</Name>
        <Title>Setores Censitários</Title>
        <KeywordList><Keyword>menu_IBGE_Censo 2010</Keyword></KeywordList>
      </Layer>
    </Layer>
  </Capability>
</WMT_MS_Capabilities>"#;

/// Truncated document (server cut the response short).
pub const TRUNCATED: &str = r#"<?xml version="1.0"?>
<WMS_Capabilities version="1.3.0"><Capability><Layer><Layer><Name>a</Name>"#;

/// Title containing every markup-significant character.
pub const HOSTILE_TITLE: &str = r#"<Layer><Layer>
  <Name>x:"quoted"</Name>
  <Title>&lt;script&gt;alert('x')&lt;/script&gt; &amp; "more"</Title>
  <KeywordList><Keyword>menu_Sec&lt;ure&gt;</Keyword></KeywordList>
</Layer></Layer>"#;
