//! Quantization labels
//!
//! Maps the `general.file_type` code stored in GGUF headers to the label
//! users know from file names. New schemes appear upstream from time to
//! time; extend the table and bump [`TABLE_REVISION`]. Codes not listed stay
//! unlabelled.

/// Revision of [`FILE_TYPE_TABLE`], bumped whenever entries are added
pub const TABLE_REVISION: u32 = 1;

/// Set on file types that were inferred by the converter rather than chosen
const GUESSED_BIT: u64 = 1024;

/// `(file_type, label)` pairs following llama.cpp's `llama_ftype`.
/// Codes 5 and 6 were removed upstream and are intentionally absent.
pub const FILE_TYPE_TABLE: &[(u64, &str)] = &[
    (0, "F32"),
    (1, "F16"),
    (2, "Q4_0"),
    (3, "Q4_1"),
    (4, "Q4_1_SOME_F16"),
    (7, "Q8_0"),
    (8, "Q5_0"),
    (9, "Q5_1"),
    (10, "Q2_K"),
    (11, "Q3_K_S"),
    (12, "Q3_K_M"),
    (13, "Q3_K_L"),
    (14, "Q4_K_S"),
    (15, "Q4_K_M"),
    (16, "Q5_K_S"),
    (17, "Q5_K_M"),
    (18, "Q6_K"),
    (19, "IQ2_XXS"),
    (20, "IQ2_XS"),
    (21, "Q2_K_S"),
    (22, "IQ3_XS"),
    (23, "IQ3_XXS"),
    (24, "IQ1_S"),
    (25, "IQ4_NL"),
    (26, "IQ3_S"),
    (27, "IQ3_M"),
    (28, "IQ2_S"),
    (29, "IQ2_M"),
    (30, "IQ4_XS"),
    (31, "IQ1_M"),
    (32, "BF16"),
    (36, "TQ1_0"),
    (37, "TQ2_0"),
    (38, "MXFP4_MOE"),
];

/// Label for a file type code, `None` for unknown codes
pub fn label_for(file_type: u64) -> Option<&'static str> {
    let code = file_type & !GUESSED_BIT;
    FILE_TYPE_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}
