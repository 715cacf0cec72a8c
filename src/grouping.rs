//! Partition COCO image records into per-video buckets

use indexmap::IndexMap;
use log::warn;

use crate::coco::Image;
use crate::error::{LabelsError, Result};

/// Video identifier -> image records of that video, in first-encounter order
pub type VideoBuckets<'a> = IndexMap<String, Vec<&'a Image>>;

/// Strip the suffix of the last path component. A trailing dot or a leading
/// dot (`abc.`, `.hidden`) is not a suffix and is kept.
pub fn strip_video_suffix(video: &str) -> &str {
    let name_start = video.rfind('/').map_or(0, |i| i + 1);
    let name = &video[name_start..];
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => &video[..name_start + dot],
        _ => video,
    }
}

/// Derive the video an image belongs to.
///
/// An explicit `video` field wins, with its extension stripped
/// (`train/v_abc.mp4` -> `train/v_abc`). Otherwise the parent directory of
/// `file_name` is used (`train/v_abc/0001.jpg` -> `v_abc`).
pub fn video_identifier(image: &Image) -> Result<String> {
    if let Some(video) = &image.video {
        return Ok(strip_video_suffix(video).to_string());
    }

    let mut segments = image.file_name.rsplit('/');
    match (segments.next(), segments.next()) {
        (Some(_), Some(parent)) => Ok(parent.to_string()),
        _ => Err(LabelsError::MalformedFileName {
            image_id: image.id,
            file_name: image.file_name.clone(),
        }),
    }
}

/// Group images by video identifier. Records are neither reordered nor deduplicated.
pub fn group_by_video<'a, I>(images: I) -> Result<VideoBuckets<'a>>
where
    I: IntoIterator<Item = &'a Image>,
{
    let mut buckets = VideoBuckets::new();
    for image in images {
        let video = video_identifier(image)?;
        buckets.entry(video).or_default().push(image);
    }
    Ok(buckets)
}

/// Keep only the requested videos. An empty filter keeps everything.
pub fn filter_videos<'a>(buckets: VideoBuckets<'a>, names: &[String]) -> VideoBuckets<'a> {
    if names.is_empty() {
        return buckets;
    }

    for name in names {
        if !buckets.contains_key(name) {
            warn!("Requested video {} is not in the annotations", name);
        }
    }

    buckets
        .into_iter()
        .filter(|(video, _)| names.contains(video))
        .collect()
}
