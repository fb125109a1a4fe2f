/// Page window over a list; pages are numbered from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,       // Current page, always >= 1
    page_size: usize,  // Items per page, always >= 1
}

impl Pager {
    /// Creates a pager on page 1; a page size of 0 is treated as 1
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(len / page_size)`, and 0 for an empty list
    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size)
    }

    /// Highest page the current page may take: never below 1
    fn last_page(&self, len: usize) -> usize {
        self.total_pages(len).max(1)
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Pulls the page back into `[1, max(1, total_pages)]`
    pub fn clamp(&mut self, len: usize) {
        self.page = self.page.clamp(1, self.last_page(len));
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.page < self.total_pages(len)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Advances one page; returns false at the last page
    pub fn next(&mut self, len: usize) -> bool {
        if self.has_next(len) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Goes back one page; returns false at page 1
    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Index range of the current page within a list of `len` items
    pub fn window(&self, len: usize) -> std::ops::Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(len);
        let end = (self.page * self.page_size).min(len);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.window(items.len())]
    }
}
