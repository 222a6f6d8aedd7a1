use crate::constants::BATCH_COUNT_PREFIX;
use crate::models::ImagePair;

/// Where the viewer is in its fetch lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewerPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Empty,
    Failed,
}

/// One rendered card: the pair as returned plus the sources actually shown, which
/// fall back to the placeholder after a load failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairView {
    pub pair: ImagePair,
    pub before_src: String,
    pub after_src: String,
}

impl From<ImagePair> for PairView {
    fn from(pair: ImagePair) -> Self {
        Self {
            before_src: pair.before_url.clone(),
            after_src: pair.after_url.clone(),
            pair,
        }
    }
}

/// Zoom modal content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoomState {
    pub url: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerState {
    pub batch_input: String,
    pub phase: ViewerPhase,
    pub pairs: Vec<PairView>,
    pub error_message: Option<String>,
    pub zoom: Option<ZoomState>,
    pub(crate) mounted: bool,
}

impl ViewerState {
    pub fn is_loading(&self) -> bool {
        self.phase == ViewerPhase::Loading
    }

    /// "Number of images in this batch: N", shown only when not loading and N > 0
    pub fn count_text(&self) -> Option<String> {
        if self.is_loading() || self.pairs.is_empty() {
            return None;
        }
        Some(format!("{}{}", BATCH_COUNT_PREFIX, self.pairs.len()))
    }

    pub(crate) fn show_error(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(name: Option<&str>) -> ImagePair {
        ImagePair {
            file_name: name.map(str::to_string),
            before_url: "b".to_string(),
            after_url: "a".to_string(),
        }
    }

    #[test]
    fn count_text_hidden_while_loading_or_empty() {
        let mut state = ViewerState::default();
        assert_eq!(state.count_text(), None);

        state.pairs = vec![pair(None).into(), pair(Some("x.jpg")).into()];
        state.phase = ViewerPhase::Loaded;
        assert_eq!(
            state.count_text().as_deref(),
            Some("Number of images in this batch: 2")
        );

        state.phase = ViewerPhase::Loading;
        assert_eq!(state.count_text(), None);
    }

    #[test]
    fn pair_view_starts_with_response_urls() {
        let view = PairView::from(pair(None));
        assert_eq!(view.before_src, "b");
        assert_eq!(view.after_src, "a");
    }
}
