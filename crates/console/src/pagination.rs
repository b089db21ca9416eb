//! Page requests and the numbered pagination control.

use models::PaginationMeta;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Requested page; `page` is 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self { Self { page, limit } }

    /// Clamp to sane values: page at least 1, limit within `1..=100`.
    pub fn normalize(self) -> Self {
        let page = if self.page == 0 { 1 } else { self.page };
        Self { page, limit: self.limit.clamp(1, MAX_LIMIT) }
    }

    pub fn with_page(self, page: u32) -> Self { Self { page, ..self } }
}

impl Default for PageRequest {
    fn default() -> Self { Self { page: 1, limit: DEFAULT_LIMIT } }
}

/// Shape of the numbered-button window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    /// Pages shown on each side of the current one.
    pub half_width: u32,
    /// Above this many pages the window collapses with ellipses.
    pub max_visible: u32,
}

impl Default for WindowConfig {
    fn default() -> Self { Self { half_width: 2, max_visible: 10 } }
}

impl From<&configs::PaginationConfig> for WindowConfig {
    fn from(cfg: &configs::PaginationConfig) -> Self {
        Self { half_width: cfg.half_width, max_visible: cfg.max_visible }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSlot {
    Page(u32),
    Ellipsis,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavButton {
    First,
    Prev,
    Next,
    Last,
}

impl NavButton {
    pub const ALL: [NavButton; 4] = [NavButton::First, NavButton::Prev, NavButton::Next, NavButton::Last];
}

#[derive(Clone, Copy, Debug)]
pub struct PaginationControl {
    meta: PaginationMeta,
    window: WindowConfig,
}

impl PaginationControl {
    pub fn new(meta: PaginationMeta, window: WindowConfig) -> Self { Self { meta: meta.normalized(), window } }

    pub fn page(&self) -> u32 { self.meta.page }

    pub fn page_count(&self) -> u32 { self.meta.page_count }

    /// Page to fetch for a request, or `None` when it is out of range or already current.
    pub fn clamp(&self, requested: u32) -> Option<u32> {
        let in_range = (1..=self.meta.page_count).contains(&requested);
        (in_range && requested != self.meta.page).then_some(requested)
    }

    pub fn target(&self, button: NavButton) -> u32 {
        match button {
            NavButton::First => 1,
            NavButton::Prev => self.meta.page.saturating_sub(1).max(1),
            NavButton::Next => (self.meta.page + 1).min(self.meta.page_count),
            NavButton::Last => self.meta.page_count,
        }
    }

    pub fn is_disabled(&self, button: NavButton) -> bool {
        match button {
            NavButton::First | NavButton::Prev => self.meta.page <= 1,
            NavButton::Next | NavButton::Last => self.meta.page >= self.meta.page_count,
        }
    }

    pub fn window(&self) -> Vec<PageSlot> {
        let page_count = self.meta.page_count;
        if page_count <= self.window.max_visible {
            return (1..=page_count).map(PageSlot::Page).collect();
        }
        // first, last and two ellipses take four slots
        let width = (2 * self.window.half_width + 1)
            .min(self.window.max_visible.saturating_sub(4))
            .max(1);
        let lowest = 2_i64;
        let highest = i64::from(page_count) - i64::from(width);
        let start = (i64::from(self.meta.page) - i64::from(width - 1) / 2).clamp(lowest, highest.max(lowest));
        let end = (start + i64::from(width) - 1).min(i64::from(page_count) - 1);

        let mut slots = Vec::with_capacity(width as usize + 4);
        slots.push(PageSlot::Page(1));
        if start > 2 {
            slots.push(PageSlot::Ellipsis);
        }
        slots.extend((start..=end).map(|p| PageSlot::Page(p as u32)));
        if end < i64::from(page_count) - 1 {
            slots.push(PageSlot::Ellipsis);
        }
        slots.push(PageSlot::Page(page_count));
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageSlot::{Ellipsis, Page};

    fn control(page: u32, page_count: u32) -> PaginationControl {
        let meta = PaginationMeta { page, page_count, total_count: u64::from(page_count) * 10, limit: 10 };
        PaginationControl::new(meta, WindowConfig::default())
    }

    #[test]
    fn normalize_clamps_zero_and_upper_bound() {
        assert_eq!(PageRequest::new(0, 0).normalize(), PageRequest::new(1, 1));
        assert_eq!(PageRequest::new(5, 1000).normalize(), PageRequest::new(5, 100));
        assert_eq!(PageRequest::default(), PageRequest::new(1, 10));
    }

    #[test]
    fn clamp_rejects_out_of_range_and_current_page() {
        let c = control(2, 3);
        assert_eq!(c.clamp(0), None);
        assert_eq!(c.clamp(4), None);
        assert_eq!(c.clamp(2), None);
        assert_eq!(c.clamp(3), Some(3));
    }

    #[test]
    fn single_page_disables_everything_without_ellipsis() {
        let c = control(1, 1);
        assert!(NavButton::ALL.iter().all(|b| c.is_disabled(*b)));
        assert_eq!(c.window(), vec![Page(1)]);
    }

    #[test]
    fn nav_buttons_follow_position() {
        let c = control(1, 5);
        assert!(c.is_disabled(NavButton::Prev));
        assert!(!c.is_disabled(NavButton::Next));
        assert_eq!(c.target(NavButton::Next), 2);

        let c = control(5, 5);
        assert!(c.is_disabled(NavButton::Last));
        assert_eq!(c.target(NavButton::Prev), 4);
        assert_eq!(c.target(NavButton::First), 1);
    }

    #[test]
    fn small_page_counts_show_every_page() {
        assert_eq!(control(3, 4).window(), vec![Page(1), Page(2), Page(3), Page(4)]);
        assert_eq!(control(1, 10).window().len(), 10);
    }

    #[test]
    fn large_page_counts_collapse_around_current() {
        assert_eq!(
            control(10, 20).window(),
            vec![Page(1), Ellipsis, Page(8), Page(9), Page(10), Page(11), Page(12), Ellipsis, Page(20)]
        );
        assert_eq!(
            control(1, 20).window(),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6), Ellipsis, Page(20)]
        );
        assert_eq!(
            control(20, 20).window(),
            vec![Page(1), Ellipsis, Page(15), Page(16), Page(17), Page(18), Page(19), Page(20)]
        );
    }

    #[test]
    fn window_respects_configured_width() {
        let meta = PaginationMeta { page: 6, page_count: 12, total_count: 120, limit: 10 };
        let c = PaginationControl::new(meta, WindowConfig { half_width: 1, max_visible: 5 });
        assert_eq!(c.window(), vec![Page(1), Ellipsis, Page(6), Ellipsis, Page(12)]);
    }
}
