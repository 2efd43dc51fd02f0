use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

pub const HLS_MIME_TYPE: &str = "application/x-mpegURL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Track,
    Catalog,
    Attachment,
    Publication,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Track => "track",
            ElementType::Catalog => "catalog",
            ElementType::Attachment => "attachment",
            ElementType::Publication => "publication",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub format: String,
}

impl StreamDescriptor {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

/// 指向衍生出此元素的原始元素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementReference {
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub uri: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ElementReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<StreamDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<StreamDescriptor>,
}

impl Element {
    pub fn new(id: impl Into<String>, element_type: ElementType, uri: Url) -> Self {
        Self {
            id: Some(id.into()),
            element_type,
            uri,
            mime_type: None,
            reference: None,
            video: None,
            audio: None,
        }
    }

    pub fn with_video(mut self, format: impl Into<String>) -> Self {
        self.video = Some(StreamDescriptor::new(format));
        self
    }

    pub fn with_audio(mut self, format: impl Into<String>) -> Self {
        self.audio = Some(StreamDescriptor::new(format));
        self
    }

    pub fn identifier(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// 產生已發佈的副本：新 URI 與 MIME 類型，清除識別碼並記錄來源元素
    pub fn distributed_copy(&self, uri: Url, mime_type: &str) -> Element {
        Element {
            id: None,
            element_type: self.element_type,
            uri,
            mime_type: Some(mime_type.to_string()),
            reference: self.id.clone().map(|identifier| ElementReference { identifier }),
            video: self.video.clone(),
            audio: self.audio.clone(),
        }
    }

    /// The identifier of the element this one was distributed from, or its own.
    pub fn origin_identifier(&self) -> Option<&str> {
        self.reference
            .as_ref()
            .map(|r| r.identifier.as_str())
            .or(self.id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Package {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            elements: Vec::new(),
        }
    }

    pub fn element_by_id(&self, element_id: &str) -> Option<&Element> {
        self.elements
            .iter()
            .find(|e| e.identifier() == Some(element_id))
    }

    /// 加入元素，沒有識別碼時配發新的識別碼並回傳
    pub fn add(&mut self, mut element: Element) -> String {
        let id = match element.id.clone() {
            Some(id) if self.element_by_id(&id).is_none() => id,
            _ => format!("{}-{}", element.element_type.as_str(), Uuid::new_v4().simple()),
        };
        element.id = Some(id.clone());
        self.elements.push(element);
        id
    }

    pub fn remove(&mut self, element_id: &str) -> Option<Element> {
        let index = self
            .elements
            .iter()
            .position(|e| e.identifier() == Some(element_id))?;
        Some(self.elements.remove(index))
    }

    /// 撤回後移除已發佈的副本：所有參照同一來源元素的元素。
    /// 來源元素本身保留，即使撤回時指定的是來源的識別碼。
    pub fn remove_distributed(&mut self, element_id: &str) -> Vec<Element> {
        let Some(origin) = self
            .element_by_id(element_id)
            .and_then(Element::origin_identifier)
            .map(str::to_string)
        else {
            return Vec::new();
        };

        let (removed, kept): (Vec<Element>, Vec<Element>) = std::mem::take(&mut self.elements)
            .into_iter()
            .partition(|e| {
                e.reference
                    .as_ref()
                    .is_some_and(|r| r.identifier == origin)
            });
        self.elements = kept;
        removed
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> Element {
        Element::new(
            "track-h264",
            ElementType::Track,
            Url::parse("file:///data/media.mov").unwrap(),
        )
        .with_video("H.264")
    }

    #[test]
    fn test_distributed_copy_leaves_source_untouched() {
        let source = track();
        let uri = Url::parse("https://cdn.example.com/pkg1/track-h264/media.mov.m3u8").unwrap();

        let copy = source.distributed_copy(uri.clone(), HLS_MIME_TYPE);

        assert_eq!(copy.id, None);
        assert_eq!(copy.uri, uri);
        assert_eq!(copy.mime_type.as_deref(), Some(HLS_MIME_TYPE));
        assert_eq!(copy.origin_identifier(), Some("track-h264"));
        assert_eq!(copy.video, source.video);

        assert_eq!(source.id.as_deref(), Some("track-h264"));
        assert_eq!(source.mime_type, None);
    }

    #[test]
    fn test_package_add_assigns_fresh_identifier() {
        let mut package = Package::new("pkg1");
        package.add(track());

        let copy = track().distributed_copy(
            Url::parse("https://cdn.example.com/a.m3u8").unwrap(),
            HLS_MIME_TYPE,
        );
        let new_id = package.add(copy);

        assert!(new_id.starts_with("track-"));
        assert_ne!(new_id, "track-h264");
        assert_eq!(package.elements.len(), 2);
        assert!(package.element_by_id(&new_id).is_some());

        assert!(package.remove(&new_id).is_some());
        assert_eq!(package.elements.len(), 1);
        assert!(package.remove(&new_id).is_none());
    }

    #[test]
    fn test_remove_distributed_keeps_source_track() {
        let mut package = Package::new("pkg1");
        package.add(track());
        let copy = track().distributed_copy(
            Url::parse("https://cdn.example.com/pkg1/track-h264/media.mov.m3u8").unwrap(),
            HLS_MIME_TYPE,
        );
        let copy_id = package.add(copy);
        package.add(
            Element::new(
                "track-aac",
                ElementType::Track,
                Url::parse("file:///data/media.aac").unwrap(),
            )
            .with_audio("AAC"),
        );

        // 以來源識別碼撤回
        let removed = package.remove_distributed("track-h264");
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].identifier(), Some(copy_id.as_str()));
        assert!(package.element_by_id("track-h264").is_some());
        assert!(package.element_by_id("track-aac").is_some());
        assert_eq!(package.elements.len(), 2);

        // 以副本識別碼撤回
        let copy = track().distributed_copy(
            Url::parse("https://cdn.example.com/pkg1/track-h264/media.mov.m3u8").unwrap(),
            HLS_MIME_TYPE,
        );
        let copy_id = package.add(copy);
        let removed = package.remove_distributed(&copy_id);
        assert_eq!(removed.len(), 1);
        assert!(package.element_by_id(&copy_id).is_none());
        assert!(package.element_by_id("track-h264").is_some());

        assert!(package.remove_distributed("track-unknown").is_empty());
        assert_eq!(package.elements.len(), 2);
    }

    #[test]
    fn test_package_json_shape() {
        let json = r#"{
            "id": "pkg1",
            "elements": [
                {"id": "track-aac", "type": "track", "uri": "file:///data/media.aac", "audio": {"format": "AAC"}},
                {"id": "catalog-1", "type": "catalog", "uri": "file:///data/dublincore.xml"}
            ]
        }"#;

        let package = Package::from_json(json).unwrap();
        assert_eq!(package.elements.len(), 2);
        let aac = package.element_by_id("track-aac").unwrap();
        assert_eq!(aac.audio.as_ref().unwrap().format, "AAC");
        assert_eq!(aac.video, None);
        assert_eq!(
            package.element_by_id("catalog-1").unwrap().element_type,
            ElementType::Catalog
        );
    }
}
