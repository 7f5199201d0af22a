use std::io::Write;
use std::sync::{Mutex, MutexGuard};

/// The parts of the document a submission touches: the `loading`
/// indicator, the `results` area and a blocking warning to the user.
pub trait Page: Send + Sync {
    fn alert(&self, message: &str);
    fn set_loading(&self, visible: bool);
    fn set_results(&self, html: String);
}

/// Shows the loading indicator for as long as it is alive.
pub struct LoadingGuard<'a, F: Fn(&dyn Page)> {
    page: &'a dyn Page,
    release: F,
}

impl<'a, F: Fn(&dyn Page)> LoadingGuard<'a, F> {
    /// `release` runs on drop and decides whether to hide the indicator;
    /// a newer submission may have taken it over.
    pub fn show(page: &'a dyn Page, release: F) -> Self {
        page.set_loading(true);
        Self { page, release }
    }
}

impl<F: Fn(&dyn Page)> Drop for LoadingGuard<'_, F> {
    fn drop(&mut self) {
        (self.release)(self.page);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    pub loading: bool,
    pub results: String,
    pub alerts: Vec<String>,
    /// Every value the loading indicator was set to, in order.
    pub loading_history: Vec<bool>,
}

/// A page kept in memory. Used by the HTTP host and in tests.
#[derive(Debug, Default)]
pub struct MemoryPage {
    state: Mutex<PageState>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PageState {
        self.lock().clone()
    }

    pub fn results(&self) -> String {
        self.lock().results.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn alerts(&self) -> Vec<String> {
        self.lock().alerts.clone()
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Page for MemoryPage {
    fn alert(&self, message: &str) {
        self.lock().alerts.push(message.to_string());
    }

    fn set_loading(&self, visible: bool) {
        let mut state = self.lock();
        state.loading = visible;
        state.loading_history.push(visible);
    }

    fn set_results(&self, html: String) {
        self.lock().results = html;
    }
}

/// Writes results to stdout and everything else to stderr.
#[derive(Debug, Default)]
pub struct ConsolePage;

impl Page for ConsolePage {
    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }

    fn set_loading(&self, visible: bool) {
        if visible {
            eprintln!("searching...");
        }
    }

    fn set_results(&self, html: String) {
        if html.is_empty() {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{html}") {
            log::error!("failed to write results: {e}");
        }
    }
}

#[test]
fn test_loading_guard_releases_when_owner() {
    let page = MemoryPage::new();
    {
        let _guard = LoadingGuard::show(&page, |page| page.set_loading(false));
        assert!(page.is_loading());
    }
    assert!(!page.is_loading());
    assert_eq!(page.snapshot().loading_history, vec![true, false]);
}

#[test]
fn test_loading_guard_leaves_indicator_to_newer_owner() {
    let page = MemoryPage::new();
    {
        let _guard = LoadingGuard::show(&page, |_| {});
    }
    assert!(page.is_loading());
}
