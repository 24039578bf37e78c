//! Tap-to-paginate state machine for the widget.
//!
//! Three pages cycle in order; tapping the bottom of the widget moves forward,
//! tapping the top moves back, both wrapping around.

/// A widget page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Page {
    /// Dot-matrix sprite
    #[default]
    Image,
    /// Name and Pokédex number
    Name,
    /// Flavor text
    Description,
}

/// A tap on the widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tap {
    /// Bottom tap zone
    Next,
    /// Top tap zone
    Prev,
}

impl Page {
    /// All pages in display order.
    pub const ALL: [Page; 3] = [Page::Image, Page::Name, Page::Description];

    /// Stored page index.
    pub fn index(self) -> u8 {
        match self {
            Page::Image => 0,
            Page::Name => 1,
            Page::Description => 2,
        }
    }

    /// Page for a stored index; anything unknown resets to the image page.
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => Page::Name,
            2 => Page::Description,
            _ => Page::Image,
        }
    }

    pub fn next(self) -> Self {
        Self::from_index(i64::from((self.index() + 1) % 3))
    }

    pub fn prev(self) -> Self {
        Self::from_index(i64::from((self.index() + 2) % 3))
    }

    /// Page shown after `tap`.
    pub fn after(self, tap: Tap) -> Self {
        match tap {
            Tap::Next => self.next(),
            Tap::Prev => self.prev(),
        }
    }
}
