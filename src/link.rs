use tracing::warn;

use crate::document::{Cel, CelLink, Frame};
use crate::error::ErrorKind;
use crate::options::LinkPolicy;

/// Fills in every linked cel from its source, walking frames in order so that
/// links to links resolve. Returns how many links were resolved.
pub(crate) fn resolve_links(frames: &mut [Frame], policy: LinkPolicy) -> Result<usize, ErrorKind> {
    let mut resolved = 0;
    for index in 0..frames.len() {
        let (earlier, rest) = frames.split_at_mut(index);
        for cel in rest[0].cels.iter_mut() {
            let Some(link) = cel.link else {
                continue;
            };
            // only strictly earlier frames can be sources
            let source = earlier
                .get(usize::from(link.source_frame))
                .and_then(|frame| source_cel(frame, cel.layer_index));

            match source {
                Some(source) => {
                    cel.width = source.width;
                    cel.height = source.height;
                    cel.payload = source.payload.clone();
                    cel.tilemap = source.tilemap;
                    cel.link = Some(CelLink {
                        resolved: true,
                        ..link
                    });
                    resolved += 1;
                }
                None => match policy {
                    LinkPolicy::Fail => {
                        return Err(ErrorKind::UnresolvedCelLink {
                            frame: index,
                            layer: cel.layer_index,
                            source_frame: link.source_frame,
                        })
                    }
                    LinkPolicy::Degrade => {
                        warn!(
                            frame = index,
                            layer = cel.layer_index,
                            source_frame = link.source_frame,
                            "linked cel has no source, leaving it empty"
                        );
                    }
                },
            }
        }
    }
    Ok(resolved)
}

fn source_cel(frame: &Frame, layer: u16) -> Option<&Cel> {
    frame
        .cels
        .iter()
        .find(|cel| cel.layer_index == layer && cel.link.map_or(true, |link| link.resolved))
}
