use bitflags::bitflags;

bitflags! {
    /// Flags indicating which published values a frame changed
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ChangeFlags: u8 {
        /// Smoothed progress (fraction and percent)
        const PROGRESS      = 0b0001;
        /// Published color triple
        const COLOR         = 0b0010;
        /// Index of the active section
        const SECTION_INDEX = 0b0100;
        /// A section's parallax offset
        const OFFSET        = 0b1000;
    }
}

impl ChangeFlags {
    /// Add `flag` when `changed` is true; never clears.
    pub fn mark(&mut self, flag: ChangeFlags, changed: bool) {
        if changed {
            self.insert(flag);
        }
    }
}
