/// View cursor over the question sequence. Knows nothing about answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    pub fn next(&mut self) {
        if !self.is_last() {
            self.index += 1;
        }
    }

    pub fn previous(&mut self) {
        if !self.is_first() {
            self.index -= 1;
        }
    }

    /// Moves to `index` if it is in range. Returns whether the cursor moved there.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index < self.len {
            self.index = index;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_stops_at_last() {
        let mut c = Cursor::new(3);
        c.next();
        c.next();
        assert!(c.is_last());
        c.next();
        assert_eq!(c.index(), 2);
    }

    #[test]
    fn previous_stops_at_first() {
        let mut c = Cursor::new(3);
        c.previous();
        assert_eq!(c.index(), 0);
        c.next();
        c.previous();
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn jump_to_range_checked() {
        let mut c = Cursor::new(4);
        assert!(c.jump_to(3));
        assert_eq!(c.index(), 3);
        assert!(!c.jump_to(4));
        assert_eq!(c.index(), 3);
        c.reset();
        assert!(c.is_first());
    }

    #[test]
    fn single_question_is_first_and_last() {
        let mut c = Cursor::new(1);
        assert!(c.is_first() && c.is_last());
        c.next();
        c.previous();
        assert_eq!(c.index(), 0);
    }
}
