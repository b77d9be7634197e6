//! Named progressions the theory scorer matches against.
//!
//! Numerals are base numerals (no seventh or quality marks) so "V7" in a
//! path matches "V" here. Every template is read cyclically.

pub struct NamedProgression {
    pub name: &'static str,
    pub numerals: &'static [&'static str],
}

impl NamedProgression {
    const fn new(name: &'static str, numerals: &'static [&'static str]) -> Self {
        Self { name, numerals }
    }

    /// Numeral at `position`, wrapping around the end.
    pub fn at(&self, position: usize) -> &'static str {
        self.numerals[position % self.numerals.len()]
    }
}

pub static PROGRESSIONS: &[NamedProgression] = &[
    // Pop
    NamedProgression::new("Axis", &["I", "V", "vi", "IV"]),
    NamedProgression::new("Doo-wop", &["I", "vi", "IV", "V"]),
    NamedProgression::new("Royal road", &["IV", "V", "iii", "vi"]),
    NamedProgression::new("Pachelbel", &["I", "V", "vi", "iii", "IV", "I", "IV", "V"]),
    NamedProgression::new("Blues", &["I", "IV", "I", "V"]),
    // Jazz
    NamedProgression::new("Jazz ii-V-I", &["ii", "V", "I"]),
    NamedProgression::new("Minor ii-V-i", &["ii", "V", "i"]),
    NamedProgression::new("Circle", &["vi", "ii", "V", "I"]),
    NamedProgression::new("Rhythm changes", &["I", "vi", "ii", "V"]),
    // Modal and minor
    NamedProgression::new("Andalusian", &["i", "VII", "VI", "V"]),
    NamedProgression::new("Aeolian vamp", &["i", "VI", "VII"]),
    NamedProgression::new("Epic minor", &["i", "VI", "III", "VII"]),
    NamedProgression::new("Mixolydian vamp", &["I", "bVII", "IV"]),
    NamedProgression::new("Minor plagal", &["IV", "iv", "I"]),
    NamedProgression::new("Backdoor", &["iv", "bVII", "I"]),
    // Cadences
    NamedProgression::new("Perfect cadence", &["V", "I"]),
    NamedProgression::new("Minor cadence", &["V", "i"]),
    NamedProgression::new("Plagal cadence", &["IV", "I"]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = PROGRESSIONS.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), PROGRESSIONS.len());
    }

    #[test]
    fn templates_wrap() {
        let axis = &PROGRESSIONS[0];
        assert_eq!(axis.at(4), "I");
        assert!(PROGRESSIONS.iter().all(|p| p.numerals.len() >= 2));
    }
}
