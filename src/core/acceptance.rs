use crate::core::{Element, ElementType};

pub const ACCEPTED_VIDEO_FORMATS: [&str; 2] = ["H.264", "AVC"];
pub const ACCEPTED_AUDIO_FORMAT: &str = "AAC";

/// 判斷元素能否由本頻道發佈
///
/// 切片只複製編碼，因此只接受 H.264/AVC 視訊與 AAC 音訊的 track；
/// 出現的每一種串流都必須在白名單內，且至少要有一種串流。
pub fn accepts(element: &Element) -> bool {
    if element.element_type != ElementType::Track {
        return false;
    }

    match (&element.video, &element.audio) {
        (None, None) => false,
        (video, audio) => {
            let video_ok = video
                .as_ref()
                .map_or(true, |v| ACCEPTED_VIDEO_FORMATS.contains(&v.format.as_str()));
            let audio_ok = audio
                .as_ref()
                .map_or(true, |a| a.format == ACCEPTED_AUDIO_FORMAT);
            video_ok && audio_ok
        }
    }
}
