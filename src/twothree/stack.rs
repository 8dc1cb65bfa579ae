/// LIFO of nodes visited on the way down, popped on the way back up.
///
/// One stack is built per operation and dropped when the operation returns,
/// so nothing recorded by one call can leak into the next.
#[derive(Debug)]
pub struct BacktrackStack<T> {
    entries: Vec<T>,
}

impl<T> BacktrackStack<T> {
    pub fn new() -> Self {
        BacktrackStack {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: T) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop()
    }

    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.entries.last_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Pops every remaining entry, returning how many there were.
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        while self.pop().is_some() {
            drained += 1;
        }
        drained
    }
}

impl<T> Default for BacktrackStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for BacktrackStack<T> {
    fn clone(&self) -> Self {
        BacktrackStack {
            entries: self.entries.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_reverse_push_order() {
        let mut stack = BacktrackStack::new();
        for i in 0..4 {
            stack.push(i);
        }

        assert_eq!(stack.len(), 4);
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), Some(0));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_drain_empties_stack() {
        let mut stack = BacktrackStack::new();
        stack.push("a");
        stack.push("b");

        assert_eq!(stack.drain(), 2);
        assert!(stack.is_empty());
        assert_eq!(stack.drain(), 0);
    }

    #[test]
    fn test_peek_mut_edits_top() {
        let mut stack = BacktrackStack::new();
        stack.push(1);
        stack.push(2);

        if let Some(top) = stack.peek_mut() {
            *top += 10;
        }

        assert_eq!(stack.pop(), Some(12));
        assert_eq!(stack.pop(), Some(1));
    }
}
