/// Player control inputs.
#[derive(Debug, Default)]
pub struct Controls {
    /// Move the player.
    pub direction: Direction,
    /// Shoot a bullet. Only the first frame of a press counts.
    pub fire: bool,
    /// Start a game, save a name or leave the leaderboard.
    pub confirm: bool,
    /// Back out to the title screen.
    pub cancel: bool,
    /// Show the leaderboard from the title screen.
    pub scores: bool,
    /// Keys typed this frame, for name entry.
    pub text: Vec<TextInput>,
}

/// The player can only move left or right, but can also be stationary.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Direction {
    /// Do not move the player.
    #[default]
    Still,
    /// Move to the left.
    Left,
    /// Move to the right.
    Right,
}

/// A single edit to the name being entered.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TextInput {
    Char(char),
    Backspace,
}
