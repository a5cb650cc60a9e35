use qrcode::QrCode;
use qrcode::render::{svg, unicode};

/// `identifier;label`, the scannable identity payload.
pub fn payload(identifier: &str, label: &str) -> String {
    format!("{identifier};{label}")
}

/// Render for a terminal overlay. `None` when the payload cannot be
/// encoded; callers clear any previously shown code instead of erroring.
pub fn render_unicode(payload: &str) -> Option<String> {
    let code = QrCode::new(payload).ok()?;
    Some(
        code.render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Dark)
            .light_color(unicode::Dense1x2::Light)
            .build(),
    )
}

/// Render as a standalone SVG document for export.
pub fn render_svg(payload: &str) -> Option<String> {
    let code = QrCode::new(payload).ok()?;
    Some(
        code.render::<svg::Color>()
            .min_dimensions(256, 256)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build(),
    )
}

#[cfg(test)]
mod test {
    use super::{payload, render_svg, render_unicode};

    #[test]
    fn payload_joins_identifier_and_label_with_semicolon() {
        assert_eq!(
            payload("a0b1c3d2-af1c-a4b6-d0c4-000000000000", "Lobby"),
            "a0b1c3d2-af1c-a4b6-d0c4-000000000000;Lobby"
        );
    }

    #[test]
    fn unicode_render_produces_output() {
        let rendered = render_unicode("a0b1c3d2-af1c-a4b6-d0c4-000000000000;Lobby").unwrap();
        assert!(!rendered.is_empty());
    }

    #[test]
    fn svg_render_produces_a_document() {
        let rendered = render_svg("a0b1c3d2-af1c-a4b6-d0c4-000000000000;Lobby").unwrap();
        assert!(rendered.contains("<svg"));
    }

    #[test]
    fn oversized_payload_renders_as_none() {
        let oversized = "x".repeat(4096);
        assert!(render_unicode(&oversized).is_none());
    }
}
