//! Small built-in frequency tables for demos and tests.
//! Counts are illustrative relative frequencies, not census figures.

use crate::models::NameType;
use crate::provider::TableProvider;
use std::collections::HashMap;
use std::sync::LazyLock;

type NameTable = &'static [(&'static str, u64)];

/// Country code to (first names, last names)
pub static DEMO_NAMES: LazyLock<HashMap<&'static str, (NameTable, NameTable)>> =
    LazyLock::new(|| {
        let mut m: HashMap<&'static str, (NameTable, NameTable)> = HashMap::new();

        m.insert("TUR", (
            &[
                ("mehmet", 5200), ("mustafa", 4100), ("ahmet", 3900), ("ali", 3500),
                ("ayse", 3300), ("fatma", 3200), ("emine", 2100), ("huseyin", 1900),
                ("zeynep", 1700), ("elif", 1400), ("can", 600), ("deniz", 450),
            ],
            &[
                ("yilmaz", 4800), ("kaya", 3100), ("demir", 2900), ("sahin", 2600),
                ("celik", 2400), ("yildiz", 2200), ("aydin", 1700), ("ozturk", 1600),
                ("arslan", 1200), ("dogan", 1100),
            ],
        ));

        m.insert("DEU", (
            &[
                ("maria", 3000), ("thomas", 2700), ("michael", 2600), ("andreas", 2100),
                ("stefan", 1900), ("anna", 1800), ("julia", 1500), ("lukas", 1100),
                ("lena", 900), ("jonas", 800),
            ],
            &[
                ("muller", 5000), ("schmidt", 3500), ("schneider", 2400), ("fischer", 2200),
                ("weber", 1900), ("meyer", 1800), ("wagner", 1600), ("becker", 1400),
            ],
        ));

        m.insert("SYR", (
            &[
                ("mohammad", 4800), ("ahmad", 3600), ("omar", 2100), ("khaled", 1800),
                ("fatima", 2500), ("aisha", 1300), ("rama", 700), ("yara", 600),
            ],
            &[
                ("haddad", 1500), ("khoury", 1400), ("nasser", 1100), ("hamdan", 900),
                ("sabbagh", 600), ("darwish", 550),
            ],
        ));

        m.insert("GRC", (
            &[
                ("georgios", 2900), ("dimitrios", 2400), ("konstantinos", 2300),
                ("maria", 3100), ("eleni", 2200), ("ioannis", 2000), ("sofia", 900),
            ],
            &[
                ("papadopoulos", 1800), ("pappas", 1100), ("georgiou", 1000),
                ("nikolaidis", 700), ("oikonomou", 650),
            ],
        ));

        m.insert("POL", (
            &[
                ("anna", 3400), ("piotr", 3000), ("krzysztof", 2700), ("katarzyna", 2600),
                ("tomasz", 2100), ("agnieszka", 1900), ("jakub", 1200), ("zofia", 700),
            ],
            &[
                ("nowak", 3900), ("kowalski", 2700), ("wisniewski", 2000),
                ("wojcik", 1800), ("kaminski", 1300),
            ],
        ));

        m.insert("ITA", (
            &[
                ("giuseppe", 3300), ("giovanni", 2800), ("antonio", 2700), ("maria", 3600),
                ("anna", 1900), ("francesco", 1800), ("giulia", 1000), ("leonardo", 800),
            ],
            &[
                ("rossi", 3500), ("russo", 2400), ("ferrari", 2200), ("esposito", 2000),
                ("bianchi", 1600), ("romano", 1500),
            ],
        ));

        m
    });

/// Migration affinity for residents of Germany
pub const DEU_MIGRATION: &[(&str, f64)] = &[
    ("TUR", 2.75),
    ("POL", 0.87),
    ("SYR", 0.82),
    ("ITA", 0.64),
    ("GRC", 0.36),
];

/// Provider over the built-in tables.
pub fn provider() -> TableProvider {
    let mut provider = TableProvider::new();
    for (country, (first, last)) in DEMO_NAMES.iter() {
        for &(name, freq) in first.iter() {
            provider.insert_name(country, NameType::First, name, freq);
        }
        for &(name, freq) in last.iter() {
            provider.insert_name(country, NameType::Last, name, freq);
        }
    }
    provider.with_migration("DEU", DEU_MIGRATION.iter().copied())
}
