use ratatui::widgets::ListState;

/// Selection over a list whose items live elsewhere and may shrink under it.
#[derive(Default)]
pub struct ListCursor {
    pub state: ListState,
}

impl ListCursor {
    pub fn new(len: usize) -> ListCursor {
        let mut cursor = ListCursor::default();
        cursor.reset(len);
        cursor
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    /// Start with the first item selected, or nothing when empty.
    pub fn reset(&mut self, len: usize) {
        self.state.select(if len == 0 { None } else { Some(0) });
    }

    /// Keeps the selection in range after items were removed.
    pub fn clamp(&mut self, len: usize) {
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            _ => {}
        }
    }

    pub fn next(&mut self, len: usize) {
        self.jump_down(1, len);
    }

    pub fn previous(&mut self, len: usize) {
        self.jump_up(1, len);
    }

    pub fn first(&mut self, len: usize) {
        self.reset(len);
    }

    pub fn last(&mut self, len: usize) {
        self.state.select(len.checked_sub(1));
    }

    pub fn jump_up(&mut self, offset: usize, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => i.saturating_sub(offset),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn jump_down(&mut self, offset: usize, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + offset).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_stays_in_bounds() {
        let mut cursor = ListCursor::new(3);
        cursor.previous(3);
        assert_eq!(cursor.selected(), Some(0));
        cursor.jump_down(10, 3);
        assert_eq!(cursor.selected(), Some(2));
        cursor.next(3);
        assert_eq!(cursor.selected(), Some(2));
        cursor.jump_up(1, 3);
        assert_eq!(cursor.selected(), Some(1));
    }

    #[test]
    fn empty_list_has_no_selection() {
        let mut cursor = ListCursor::new(0);
        cursor.next(0);
        cursor.last(0);
        assert_eq!(cursor.selected(), None);
    }

    #[test]
    fn clamp_after_removal() {
        let mut cursor = ListCursor::new(3);
        cursor.last(3);
        cursor.clamp(2);
        assert_eq!(cursor.selected(), Some(1));
        cursor.clamp(0);
        assert_eq!(cursor.selected(), None);
    }
}
