use super::domain::ClaimType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTemplate {
    pub key: &'static str,
    pub title: &'static str,
    pub required: bool,
    pub required_docs: u32,
}

/// Ordered checklist items a claim of one type must work through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistTemplate {
    pub claim_type: ClaimType,
    pub items: Vec<ItemTemplate>,
}

impl ChecklistTemplate {
    pub fn for_claim_type(claim_type: ClaimType) -> Self {
        let mut items = common_items();
        items.extend(match claim_type {
            ClaimType::WaterDamage => water_damage_items(),
            ClaimType::Fire => fire_items(),
            ClaimType::Theft => theft_items(),
            ClaimType::WindHail => wind_hail_items(),
            ClaimType::Liability => liability_items(),
            ClaimType::Other => other_items(),
        });
        Self { claim_type, items }
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.items.iter().map(|item| item.key).collect()
    }
}

const fn item(
    key: &'static str,
    title: &'static str,
    required: bool,
    required_docs: u32,
) -> ItemTemplate {
    ItemTemplate {
        key,
        title,
        required,
        required_docs,
    }
}

fn common_items() -> Vec<ItemTemplate> {
    vec![
        item("policy_review", "Confirm policy number and coverage", true, 1),
        item("incident_summary", "Write a dated summary of the incident", true, 0),
    ]
}

fn water_damage_items() -> Vec<ItemTemplate> {
    vec![
        item("water_source_stopped", "Stop the water source and document the shutoff", true, 1),
        item("water_damage_photos", "Photograph affected rooms before cleanup", true, 2),
        item("water_mitigation_invoice", "Upload the mitigation company invoice", true, 1),
        item("water_moisture_readings", "Record moisture readings", false, 0),
    ]
}

fn fire_items() -> Vec<ItemTemplate> {
    vec![
        item("fire_department_report", "Obtain the fire department report", true, 1),
        item("fire_damage_photos", "Photograph structural and contents damage", true, 2),
        item("fire_contents_inventory", "List damaged contents with estimated values", true, 1),
        item("fire_living_expenses", "Keep receipts for additional living expenses", false, 0),
    ]
}

fn theft_items() -> Vec<ItemTemplate> {
    vec![
        item("theft_police_report", "File a police report and record the case number", true, 1),
        item("theft_stolen_items", "List stolen items with proof of ownership", true, 1),
        item("theft_entry_photos", "Photograph points of forced entry", false, 0),
    ]
}

fn wind_hail_items() -> Vec<ItemTemplate> {
    vec![
        item("wind_storm_date", "Confirm the storm date with a weather report", true, 1),
        item("wind_roof_inspection", "Schedule a roof inspection", true, 1),
        item("wind_exterior_photos", "Photograph roof, siding, and window damage", true, 2),
        item("wind_temporary_repairs", "Document temporary repairs to prevent further damage", false, 0),
    ]
}

fn liability_items() -> Vec<ItemTemplate> {
    vec![
        item("liability_incident_report", "Complete an incident report", true, 1),
        item("liability_witnesses", "Collect witness contact details", true, 0),
        item("liability_medical_records", "Gather related medical bills", false, 0),
    ]
}

fn other_items() -> Vec<ItemTemplate> {
    vec![item("other_supporting_documents", "Upload supporting documents", true, 1)]
}
