pub mod edit;
pub mod store;

use imageflow_core::{ComparisonRenderer, NoticeLevel, Notifier};

pub use edit::{parse_edit, EditAction, ImageEdit};
pub use store::FsObjectStore;

/// Widest card label printed before truncation
pub const LABEL_WIDTH: usize = 40;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Plain-text stand-in for the before/after comparison control
#[derive(Debug, Default)]
pub struct TextRenderer {
    lines: Vec<String>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_output(self) -> String {
        self.lines.join("\n")
    }
}

impl ComparisonRenderer for TextRenderer {
    fn render_pair(&mut self, index: usize, label: &str, before_src: &str, after_src: &str) {
        self.lines
            .push(format!("[{}] {}", index, truncate_string(label, LABEL_WIDTH)));
        self.lines.push(format!("    before: {}", before_src));
        self.lines.push(format!("    after:  {}", after_src));
    }
}

/// Prints notices to stdout (success) or stderr (error)
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success => println!("{}", message),
            NoticeLevel::Error => eprintln!("{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_exact() {
        assert_eq!(truncate_string("hello", 5), "hello");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn truncate_string_multibyte() {
        assert_eq!(truncate_string("ééééééé.jpg", 6), "ééé...");
    }

    #[test]
    fn renderer_lists_each_pair() {
        let mut renderer = TextRenderer::new();
        renderer.render_pair(0, "cat.jpg", "http://b", "http://a");
        renderer.render_pair(1, &"x".repeat(60), "b2", "a2");

        assert_eq!(renderer.lines().len(), 6);
        assert_eq!(renderer.lines()[0], "[0] cat.jpg");
        assert_eq!(renderer.lines()[2], "    after:  http://a");
        assert!(renderer.lines()[3].ends_with("..."));
        assert!(renderer.into_output().contains("before: b2"));
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
