/// Background music bed chosen for a slide, keyed by era depth.
///
/// Distinct keys may resolve to the same recording; the bed only restarts
/// when the resolved track changes, not on every key change.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AmbienceKey {
    /// Cover slide.
    Cover,
    /// Present-day and original-input slides.
    Modern,
    /// Circa-1900 slides.
    Y1900,
    /// Circa-1800 slides.
    Y1800,
    /// Baroque-era slides.
    Baroque,
    /// Renaissance and older.
    Renaissance,
}

impl AmbienceKey {
    /// Map a slide level to its music bed.
    pub fn for_level(level: i32) -> Self {
        match level {
            0 => Self::Cover,
            l if l >= 5 => Self::Renaissance,
            4 => Self::Baroque,
            3 => Self::Y1800,
            2 => Self::Y1900,
            _ => Self::Modern,
        }
    }

    /// Public-domain recording fetched as this key's bed.
    pub fn track_url(self) -> &'static str {
        match self {
            Self::Cover | Self::Y1800 => {
                "https://upload.wikimedia.org/wikipedia/commons/e/eb/Frederic_Chopin_-_Nocturne_Op_9_No_2.ogg"
            }
            Self::Modern => {
                "https://upload.wikimedia.org/wikipedia/commons/c/c8/Erik_Satie_-_Gymnop%C3%A9die_No._1.ogg"
            }
            Self::Y1900 => {
                "https://upload.wikimedia.org/wikipedia/commons/5/51/Scott_Joplin_-_The_Entertainer_%281902%2C_piano_roll%29.ogg"
            }
            Self::Baroque => {
                "https://upload.wikimedia.org/wikipedia/commons/1/1b/Johann_Sebastian_Bach_-_No._1_-_Pr%C3%A9lude_in_C_Major%2C_BWV_846.ogg"
            }
            Self::Renaissance => {
                "https://upload.wikimedia.org/wikipedia/commons/b/b0/John_Dowland_-_Come_Again.ogg"
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/ambience.rs"]
mod tests;
