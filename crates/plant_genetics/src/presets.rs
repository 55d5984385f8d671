//! Named starter genotypes.

pub const CARROT: &str = "FC:RY-SZ:22-LS:33-BP:11-GR:12-YD:44-RS:22-WN:22";
pub const SUNFLOWER: &str = "FC:YY-SZ:55-LS:22-BP:11-GR:33-YD:33-RS:33-WN:44";
pub const LAVENDER: &str = "FC:BR-SZ:22-LS:32-BP:33-GR:22-YD:33-RS:44-WN:11";
pub const TOMATO: &str = "FC:RR-SZ:33-LS:21-BP:21-GR:34-YD:45-RS:23-WN:43";
pub const WILDFLOWER: &str = "FC:WY-SZ:11-LS:13-BP:23-GR:45-YD:22-RS:55-WN:12";

pub const PRESETS: &[(&str, &str)] = &[
    ("carrot", CARROT),
    ("sunflower", SUNFLOWER),
    ("lavender", LAVENDER),
    ("tomato", TOMATO),
    ("wildflower", WILDFLOWER),
];

/// Looks up a preset sequence by name, ignoring case.
pub fn preset(name: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(preset, _)| preset.eq_ignore_ascii_case(name.trim()))
        .map(|(_, sequence)| *sequence)
}

pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|(name, _)| *name)
}
