/// One way of turning a page into plain text.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` (or empty text) hands the page to the next strategy.
    fn attempt(&self, html: &str) -> Option<String>;

    /// A last-resort strategy's output is final, even when empty.
    fn is_last_resort(&self) -> bool {
        false
    }
}
