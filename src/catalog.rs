/// One inventory item: display name, barcode value, unit of measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub name: &'static str,
    pub code: &'static str,
    pub unit: &'static str,
}

const fn p(name: &'static str, code: &'static str, unit: &'static str) -> Product {
    Product { name, code, unit }
}

/// Raw material catalog, in print order.
pub const CATALOG: &[Product] = &[
    p("Tea Powder",           "RM-TEA",  "kg"),
    p("Milk Powder",          "RM-SMP",  "kg"),
    p("Condensed Milk",       "RM-CM",   "kg"),
    p("Buffalo Milk",         "RM-BFM",  "L"),
    p("Sugar",                "RM-SUG",  "kg"),
    p("Buns",                 "RM-BUN",  "pcs"),
    p("Chicken Cutlet (Raw)", "RM-CCT",  "pcs"),
    p("Osmania (Loose)",      "RM-OSMG", "pcs"),
    p("Osmania Box",          "RM-OSMN", "box"),
    p("Filter Water",         "RM-WTR",  "L"),
    p("Bottled Water",        "RM-BWR",  "pcs"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique() {
        let codes: HashSet<_> = CATALOG.iter().map(|p| p.code).collect();
        assert_eq!(codes.len(), CATALOG.len());
    }

    #[test]
    fn codes_are_printable_ascii() {
        for p in CATALOG {
            assert!(p.code.bytes().all(|b| (32..127).contains(&b)), "{}", p.code);
        }
    }
}
