/// Placeholder replaced with the scene JSON when the page is rendered.
pub const SCENE_PLACEHOLDER: &str = "__QUAKEMAP_SCENE__";

pub const MAP_PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">

<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Earthquakes</title>

  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous"
    referrerpolicy="no-referrer" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"
    referrerpolicy="no-referrer"></script>

  <style>
    html, body { height: 100%; margin: 0; padding: 0; }
    #map { height: 100%; width: 100%; }

    .legend {
      padding: 6px 8px;
      font: 14px/16px Arial, Helvetica, sans-serif;
      background: rgba(255, 255, 255, 0.85);
      box-shadow: 0 0 15px rgba(0, 0, 0, 0.2);
      border-radius: 5px;
      line-height: 24px;
      color: #555;
    }
    .legend h4 { text-align: center; margin: 2px 12px 8px; color: #777; }
    .legend i { width: 18px; height: 18px; float: left; margin: 3px 8px 0 0; opacity: 0.7; }
  </style>
</head>

<body>
  <div id="map"></div>

  <script type="application/json" id="scene-data">__QUAKEMAP_SCENE__</script>
  <script>
    (function () {
      const scene = JSON.parse(document.getElementById('scene-data').textContent);

      const tiles = scene.base_maps.tiles;
      const baseMaps = {};
      const initialLayers = [];
      for (const style of scene.base_maps.styles) {
        const layer = L.tileLayer(tiles.url_template, {
          attribution: tiles.attribution,
          tileSize: tiles.tile_size,
          zoomOffset: tiles.zoom_offset,
          maxZoom: tiles.max_zoom,
          id: style.style_id,
          accessToken: style.access_token
        });
        baseMaps[style.name] = layer;
        if (style.default_active) initialLayers.push(layer);
      }

      const quakes = scene.earthquakes;
      const earthquakes = L.layerGroup(quakes.points.map(point =>
        L.circle([point.position.latitude, point.position.longitude], {
          radius: point.radius,
          fillColor: point.fill_color,
          fillOpacity: quakes.style.fill_opacity,
          color: quakes.style.stroke_color,
          stroke: true,
          weight: quakes.style.stroke_weight
        }).bindPopup(point.popup_text)
      ));

      const overlayMaps = {};
      overlayMaps[quakes.name] = earthquakes;
      if (quakes.visible) initialLayers.push(earthquakes);

      for (const overlay of scene.overlays) {
        const layer = L.geoJSON(overlay.data, {
          style: { color: overlay.style.color, weight: overlay.style.weight }
        });
        overlayMaps[overlay.name] = layer;
        if (overlay.visible) initialLayers.push(layer);
      }

      const map = L.map('map', {
        center: scene.viewport.center,
        zoom: scene.viewport.zoom,
        layers: initialLayers
      });

      L.control.layers(baseMaps, overlayMaps, { collapsed: false }).addTo(map);

      const legend = L.control({ position: 'bottomright' });
      legend.onAdd = function () {
        const div = L.DomUtil.create('div', 'legend');
        const title = document.createElement('h4');
        title.textContent = 'Depth';
        div.appendChild(title);
        for (const entry of scene.legend) {
          const swatch = document.createElement('i');
          swatch.style.background = entry.color;
          const label = document.createElement('span');
          label.textContent = entry.label;
          div.appendChild(swatch);
          div.appendChild(label);
          div.appendChild(document.createElement('br'));
        }
        return div;
      };
      legend.addTo(map);
    })();
  </script>
</body>

</html>
"#;
