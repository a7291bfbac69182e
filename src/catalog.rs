use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CakeSize {
    Small,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CakeField {
    PdmLarge,
    PdmSmall,
    HoneyLargeWithSyrup,
    ChocolateLarge,
    ChocolateSmall,
}

impl CakeField {
    pub fn key(self) -> &'static str {
        match self {
            CakeField::PdmLarge => "property_bolo_pdm_g",
            CakeField::PdmSmall => "property_bolo_pdm_p",
            CakeField::HoneyLargeWithSyrup => "property_bolo_de_mel_g_com_calda",
            CakeField::ChocolateLarge => "property_bolo_choco_g",
            CakeField::ChocolateSmall => "property_bolo_choco_p",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CakeKind {
    pub field: CakeField,
    pub display_name: &'static str,
    pub abbreviation: &'static str,
    pub color: &'static str,
    pub size: CakeSize,
    pub base_type: &'static str,
}

pub const CATALOG: [CakeKind; 5] = [
    CakeKind {
        field: CakeField::PdmLarge,
        display_name: "Bolo Pão de Mel Grande",
        abbreviation: "PDM G",
        color: "#F59E0B",
        size: CakeSize::Large,
        base_type: "PDM",
    },
    CakeKind {
        field: CakeField::PdmSmall,
        display_name: "Bolo Pão de Mel Pequeno",
        abbreviation: "PDM P",
        color: "#F59E0B",
        size: CakeSize::Small,
        base_type: "PDM",
    },
    CakeKind {
        field: CakeField::HoneyLargeWithSyrup,
        display_name: "Bolo de Mel Grande com Calda",
        abbreviation: "MEL G",
        color: "#D97706",
        size: CakeSize::Large,
        base_type: "MEL",
    },
    CakeKind {
        field: CakeField::ChocolateLarge,
        display_name: "Bolo de Chocolate Grande",
        abbreviation: "CHOCO G",
        color: "#7C2D12",
        size: CakeSize::Large,
        base_type: "CHOCO",
    },
    CakeKind {
        field: CakeField::ChocolateSmall,
        display_name: "Bolo de Chocolate Pequeno",
        abbreviation: "CHOCO P",
        color: "#7C2D12",
        size: CakeSize::Small,
        base_type: "CHOCO",
    },
];
