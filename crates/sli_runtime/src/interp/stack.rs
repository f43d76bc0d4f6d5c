use crate::core::Token;
use crate::errors::SliError;

/// Operand or execution stack. Positions passed to `pick` count from the top.
#[derive(Default)]
pub struct TokenStack {
    items: Vec<Token>,
    peak: usize,
}

impl TokenStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, token: Token) {
        self.items.push(token);
        if self.items.len() > self.peak {
            self.peak = self.items.len();
        }
    }

    #[inline]
    pub fn pop(&mut self) -> Result<Token, SliError> {
        self.items.pop().ok_or(SliError::underflow(1, 0))
    }

    pub fn pop_n(&mut self, n: usize) -> Result<(), SliError> {
        self.require(n)?;
        self.items.truncate(self.items.len() - n);
        Ok(())
    }

    #[inline]
    pub fn top(&self) -> Result<&Token, SliError> {
        self.pick(0)
    }

    #[inline]
    pub fn top_mut(&mut self) -> Result<&mut Token, SliError> {
        self.pick_mut(0)
    }

    #[inline]
    pub fn pick(&self, n: usize) -> Result<&Token, SliError> {
        let len = self.items.len();
        if n < len {
            Ok(&self.items[len - 1 - n])
        } else {
            Err(SliError::underflow(n + 1, len))
        }
    }

    #[inline]
    pub fn pick_mut(&mut self, n: usize) -> Result<&mut Token, SliError> {
        let len = self.items.len();
        if n < len {
            Ok(&mut self.items[len - 1 - n])
        } else {
            Err(SliError::underflow(n + 1, len))
        }
    }

    pub fn require(&self, n: usize) -> Result<(), SliError> {
        if self.items.len() < n {
            Err(SliError::underflow(n, self.items.len()))
        } else {
            Ok(())
        }
    }

    #[inline]
    pub fn load(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Largest load seen so far.
    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn reset_peak(&mut self) {
        self.peak = self.items.len();
    }

    /// Bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.items.iter()
    }
}
