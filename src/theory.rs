//! Just enough music theory to resolve exercise definitions.
//!
//! Definitions are short strings such as "C#", "Amaj" or "C maj"; this module
//! turns them into pitch classes. Octaves are deliberately ignored, playing a
//! chord in any inversion or register counts.

use crate::traits::DefinitionError;

/// One of the twelve pitch classes, spelled with sharps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Semitones above C, 0..=11.
    pub fn semitone(&self) -> u8 {
        Self::ALL.iter().position(|p| p == self).unwrap() as u8
    }

    pub fn from_semitone(semitone: u8) -> PitchClass {
        Self::ALL[(semitone % 12) as usize]
    }

    /// Pitch class of a MIDI note number, any octave.
    pub fn from_midi(note: u8) -> PitchClass {
        Self::from_semitone(note % 12)
    }

    pub fn transpose(&self, semitones: u8) -> PitchClass {
        let semitone = (u16::from(self.semitone()) + u16::from(semitones)) % 12;
        Self::from_semitone(semitone as u8)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }
}

impl std::fmt::Display for PitchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a note name: a letter A-G with an optional `#` or `b`. Flats resolve
/// to their enharmonic sharp spelling, so "Db" and "C#" are the same class.
pub fn parse_note(name: &str) -> Result<PitchClass, DefinitionError> {
    let unknown = || DefinitionError::UnknownNote(name.to_owned());
    let mut chars = name.chars();
    let letter = chars.next().ok_or_else(unknown)?;
    let base: i8 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(unknown()),
    };
    let accidental: i8 = match chars.next() {
        None => 0,
        Some('#') => 1,
        Some('b') => -1,
        Some(_) => return Err(unknown()),
    };
    if chars.next().is_some() {
        return Err(unknown());
    }
    Ok(PitchClass::from_semitone((base + accidental).rem_euclid(12) as u8))
}

/// Chord qualities as semitone offsets above the root.
fn chord_intervals(quality: &str) -> Option<&'static [u8]> {
    match quality {
        "maj" => Some(&[0, 4, 7]),
        "min" => Some(&[0, 3, 7]),
        "aug" => Some(&[0, 4, 8]),
        "dim" => Some(&[0, 3, 6]),
        "dom7" => Some(&[0, 4, 7, 10]),
        "maj7" => Some(&[0, 4, 7, 11]),
        _ => None,
    }
}

/// Scale forms as semitone offsets above the root, seven degrees each.
fn scale_intervals(form: &str) -> Option<&'static [u8]> {
    match form {
        "maj" => Some(&[0, 2, 4, 5, 7, 9, 11]),
        "min" => Some(&[0, 2, 3, 5, 7, 8, 10]),
        _ => None,
    }
}

/// Resolve a chord definition such as "Amaj" or "C#dom7" into its unordered
/// constituent pitch classes.
pub fn chord_notes(definition: &str) -> Result<Vec<PitchClass>, DefinitionError> {
    // The root is the leading note name, accidental included; the remainder
    // names the quality.
    let split = definition
        .char_indices()
        .nth(1)
        .map(|(i, c)| if c == '#' || c == 'b' { i + 1 } else { i })
        .unwrap_or(definition.len());
    let root = parse_note(&definition[..split])?;
    let intervals = chord_intervals(&definition[split..])
        .ok_or_else(|| DefinitionError::UnknownChord(definition.to_owned()))?;
    Ok(intervals.iter().map(|i| root.transpose(*i)).collect())
}

/// Resolve a scale definition such as "C maj" into its degrees in ascending
/// performance order, root first.
pub fn scale_notes(definition: &str) -> Result<Vec<PitchClass>, DefinitionError> {
    let mut parts = definition.split_whitespace();
    let root = parse_note(parts.next().unwrap_or("")).map_err(|_| {
        DefinitionError::UnknownScale(definition.to_owned())
    })?;
    let intervals = parts
        .next()
        .and_then(scale_intervals)
        .ok_or_else(|| DefinitionError::UnknownScale(definition.to_owned()))?;
    Ok(intervals.iter().map(|i| root.transpose(*i)).collect())
}
