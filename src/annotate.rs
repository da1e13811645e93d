use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use tracing::instrument;

use crate::{AssociatedComponent, Error, Result, WidgetType};

pub fn widget_color(widget: WidgetType) -> Rgb<u8> {
    match widget {
        WidgetType::Button => Rgb([230, 57, 70]),
        WidgetType::Input => Rgb([29, 111, 214]),
        WidgetType::Textarea => Rgb([42, 157, 143]),
        WidgetType::Label => Rgb([244, 162, 97]),
        WidgetType::Card => Rgb([131, 56, 236]),
    }
}

/// Returns a copy of `image` with every component outlined in its type colour.
#[instrument(level = "debug", skip_all, fields(components = components.len()))]
pub fn draw_components(image: &DynamicImage, components: &[AssociatedComponent]) -> RgbImage {
    let mut canvas = image.to_rgb8();
    for component in components {
        if component.width <= 0 || component.height <= 0 {
            continue;
        }
        let color = widget_color(component.widget);
        let outer = Rect::at(component.x, component.y)
            .of_size(component.width as u32, component.height as u32);
        draw_hollow_rect_mut(&mut canvas, outer, color);
        // Second, inset outline for a 2px border.
        if component.width > 2 && component.height > 2 {
            let inner = Rect::at(component.x + 1, component.y + 1)
                .of_size(component.width as u32 - 2, component.height as u32 - 2);
            draw_hollow_rect_mut(&mut canvas, inner, color);
        }
    }
    canvas
}

/// Opens `image`, draws `components` on it and writes the result to `output`.
pub fn save_annotated(
    image: &Path,
    components: &[AssociatedComponent],
    output: &Path,
) -> Result<()> {
    let source = image::open(image).map_err(|source| Error::Image {
        path: image.to_path_buf(),
        source,
    })?;
    draw_components(&source, components)
        .save(output)
        .map_err(|source| Error::Image {
            path: output.to_path_buf(),
            source,
        })?;
    log::debug!("Wrote annotated screenshot to {}", output.display());
    Ok(())
}
