use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::field::{Field, FieldOption, ShowIf, Step};
use crate::domain::wizard::values::{keys, ValueBag};

/// Identifier of a prompt template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    ProductInEnvironment,
    StyledProduct,
    ProductWithPerson,
    FlatLay,
}

impl TemplateId {
    pub const ALL: [TemplateId; 4] = [
        TemplateId::ProductInEnvironment,
        TemplateId::StyledProduct,
        TemplateId::ProductWithPerson,
        TemplateId::FlatLay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::ProductInEnvironment => "product-in-environment",
            TemplateId::StyledProduct => "styled-product",
            TemplateId::ProductWithPerson => "product-with-person",
            TemplateId::FlatLay => "flat-lay",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Pure prompt generator of one template
pub type PromptGenerator = fn(&ValueBag) -> String;

/// Steps and prompt generator registered for one template
#[derive(Clone)]
pub struct TemplateConfig {
    pub id: TemplateId,
    pub name: &'static str,
    pub description: &'static str,
    pub steps: Vec<Step>,
    generator: PromptGenerator,
}

impl TemplateConfig {
    pub fn new(
        id: TemplateId,
        name: &'static str,
        description: &'static str,
        steps: Vec<Step>,
        generator: PromptGenerator,
    ) -> Self {
        Self {
            id,
            name,
            description,
            steps,
            generator,
        }
    }

    /// Interpolates the answers into this template's prompt paragraph
    ///
    /// Values are inserted verbatim. Callers validate the bag first; missing
    /// answers render as empty text.
    pub fn generate_prompt(&self, values: &ValueBag) -> String {
        (self.generator)(values)
    }
}

impl fmt::Debug for TemplateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .finish_non_exhaustive()
    }
}

/// Renders the sentence for an optional answer, or nothing when it is blank
fn optional_sentence(values: &ValueBag, name: &str, render: impl Fn(&str) -> String) -> String {
    match values.get(name) {
        Some(value) if !value.trim().is_empty() => render(value),
        _ => String::new(),
    }
}

/// Custom answer wins over the preset when the preset is the "custom" option
fn preset_or_custom<'a>(values: &'a ValueBag, preset: &str, custom: &str) -> &'a str {
    match values.get(preset) {
        Some(CUSTOM) => values.text(custom),
        _ => values.text(preset),
    }
}

const CUSTOM: &str = "custom";

pub(crate) fn builtin_templates() -> Vec<TemplateConfig> {
    vec![
        product_in_environment(),
        styled_product(),
        product_with_person(),
        flat_lay(),
    ]
}

fn product_in_environment() -> TemplateConfig {
    let steps = vec![
        Step::new(
            3,
            "Environment",
            vec![
                Field::dropdown(
                    "environment",
                    "Where should your product appear?",
                    vec![
                        FieldOption::new("Kitchen counter", "a sunlit kitchen counter"),
                        FieldOption::new("Outdoor café", "an outdoor café table"),
                        FieldOption::new("Modern office", "a modern minimalist office desk"),
                        FieldOption::new("Forest clearing", "a mossy forest clearing"),
                        FieldOption::new("Beach", "a sandy beach at the water's edge"),
                        FieldOption::new("Something else", CUSTOM),
                    ],
                ),
                Field::text("customEnvironment", "Describe the environment")
                    .placeholder("e.g. a rooftop garden in Tokyo")
                    .show_if(ShowIf::equals("environment", CUSTOM)),
                Field::radio(
                    "timeOfDay",
                    "Time of day",
                    vec![
                        FieldOption::new("Morning", "soft morning light"),
                        FieldOption::new("Golden hour", "warm golden hour"),
                        FieldOption::new("Night", "night with ambient artificial light"),
                    ],
                ),
            ],
        )
        .described("Pick the real-world setting for the shot."),
        Step::new(
            4,
            "Mood & Camera",
            vec![
                Field::creatable(
                    "mood",
                    "Overall mood",
                    vec![
                        FieldOption::new("Cozy", "cozy and inviting"),
                        FieldOption::new("Energetic", "bright and energetic"),
                        FieldOption::new("Luxurious", "luxurious and refined"),
                        FieldOption::new("Minimal", "calm and minimal"),
                    ],
                )
                .tooltip("Pick one or type your own"),
                Field::dropdown(
                    "cameraAngle",
                    "Camera angle",
                    vec![
                        FieldOption::new("Eye level", "an eye-level"),
                        FieldOption::new("Top down", "a top-down"),
                        FieldOption::new("Low angle", "a low"),
                        FieldOption::new("Close-up", "a close-up"),
                    ],
                ),
                Field::text("props", "Supporting props")
                    .placeholder("e.g. a steaming cup of coffee, an open book")
                    .optional(),
            ],
        ),
    ];

    TemplateConfig::new(
        TemplateId::ProductInEnvironment,
        "Product in Environment",
        "Your product placed naturally in a real-world setting.",
        steps,
        |v| {
            format!(
                "A photorealistic advertisement image of {} ({}) placed naturally in {}, \
                 photographed in {}. The overall mood is {}, captured from {} angle.{} \
                 Composed in {} orientation with the product as the clear focal point.",
                v.text(keys::PRODUCT_NAME),
                v.text(keys::PRODUCT_DESCRIPTION),
                preset_or_custom(v, "environment", "customEnvironment"),
                v.text("timeOfDay"),
                v.text("mood"),
                v.text("cameraAngle"),
                optional_sentence(v, "props", |p| format!(" Include supporting props: {}.", p)),
                v.text(keys::ORIENTATION),
            )
        },
    )
}

fn styled_product() -> TemplateConfig {
    let steps = vec![
        Step::new(
            3,
            "Styling",
            vec![
                Field::dropdown(
                    "backdrop",
                    "Backdrop",
                    vec![
                        FieldOption::new("White studio", "a seamless white studio backdrop"),
                        FieldOption::new("Pastel gradient", "a soft pastel gradient"),
                        FieldOption::new("Concrete", "a textured concrete surface"),
                        FieldOption::new("Velvet", "rich draped velvet fabric"),
                    ],
                ),
                Field::radio(
                    "lighting",
                    "Lighting",
                    vec![
                        FieldOption::new("Soft", "soft diffused studio lighting"),
                        FieldOption::new("Dramatic", "dramatic high-contrast lighting"),
                        FieldOption::new("Natural", "natural window light"),
                    ],
                ),
            ],
        )
        .described("Set the stage for a clean studio-style shot."),
        Step::new(
            4,
            "Accents",
            vec![
                Field::creatable(
                    "colorPalette",
                    "Color palette",
                    vec![
                        FieldOption::new("Earth tones", "warm earth tones"),
                        FieldOption::new("Cool", "cool blues and silvers"),
                        FieldOption::new("Vibrant", "vibrant complementary colors"),
                        FieldOption::new("Monochrome", "monochrome"),
                    ],
                ),
                Field::text("accentProps", "Accent props")
                    .placeholder("e.g. dried flowers, marble spheres")
                    .optional(),
            ],
        ),
    ];

    TemplateConfig::new(
        TemplateId::StyledProduct,
        "Styled Product",
        "A polished studio shot with curated styling.",
        steps,
        |v| {
            format!(
                "A high-end styled product shot of {}, {}. The product sits on {} with {}. \
                 Color palette: {}.{} Framed in {} orientation, crisp focus, commercial \
                 photography quality.",
                v.text(keys::PRODUCT_NAME),
                v.text(keys::PRODUCT_DESCRIPTION),
                v.text("backdrop"),
                v.text("lighting"),
                v.text("colorPalette"),
                optional_sentence(v, "accentProps", |p| format!(" Styled with {}.", p)),
                v.text(keys::ORIENTATION),
            )
        },
    )
}

fn product_with_person() -> TemplateConfig {
    let steps = vec![
        Step::new(
            3,
            "Model",
            vec![
                Field::dropdown(
                    "personType",
                    "Who is in the shot?",
                    vec![
                        FieldOption::new("Young adult", "a young adult"),
                        FieldOption::new("Professional", "a middle-aged professional"),
                        FieldOption::new("Athlete", "an athlete"),
                        FieldOption::new("Parent and child", "a parent with their child"),
                        FieldOption::new("Describe my own", CUSTOM),
                    ],
                ),
                Field::text("personDescription", "Describe the person")
                    .show_if(ShowIf::equals("personType", CUSTOM)),
                Field::radio(
                    "interaction",
                    "How do they interact with the product?",
                    vec![
                        FieldOption::new("Holding", "holding"),
                        FieldOption::new("Using", "using"),
                        FieldOption::new("Wearing", "wearing"),
                    ],
                ),
            ],
        ),
        Step::new(
            4,
            "Scene",
            vec![
                Field::text("setting", "Where is this happening?")
                    .placeholder("e.g. a bright yoga studio"),
                Field::dropdown(
                    "expression",
                    "Expression",
                    vec![
                        FieldOption::new("Smiling", "smiling naturally"),
                        FieldOption::new("Focused", "focused and determined"),
                        FieldOption::new("Relaxed", "relaxed and content"),
                        FieldOption::new("Excited", "visibly excited"),
                    ],
                ),
            ],
        ),
        Step::new(
            5,
            "Framing",
            vec![
                Field::radio(
                    "shotType",
                    "Shot type",
                    vec![
                        FieldOption::new("Close-up", "close-up on hands and product"),
                        FieldOption::new("Waist up", "waist-up portrait"),
                        FieldOption::new("Full body", "full-body lifestyle shot"),
                    ],
                ),
                Field::text("castingNotes", "Casting notes")
                    .tooltip("Age range, style, anything the model should convey")
                    .optional(),
            ],
        ),
    ];

    TemplateConfig::new(
        TemplateId::ProductWithPerson,
        "Product with Person",
        "A lifestyle shot of someone using your product.",
        steps,
        |v| {
            format!(
                "A lifestyle advertisement photo showing {} {} {} ({}) in {}. The person is {}. \
                 Shot as a {} in {} orientation, with the product clearly visible and \
                 accurately represented.{}",
                preset_or_custom(v, "personType", "personDescription"),
                v.text("interaction"),
                v.text(keys::PRODUCT_NAME),
                v.text(keys::PRODUCT_DESCRIPTION),
                v.text("setting"),
                v.text("expression"),
                v.text("shotType"),
                v.text(keys::ORIENTATION),
                optional_sentence(v, "castingNotes", |n| format!(
                    " Additional casting notes: {}.",
                    n
                )),
            )
        },
    )
}

fn flat_lay() -> TemplateConfig {
    let steps = vec![Step::new(
        3,
        "Arrangement",
        vec![
            Field::dropdown(
                "surface",
                "Surface",
                vec![
                    FieldOption::new("Marble", "a white marble countertop"),
                    FieldOption::new("Oak", "light oak wood"),
                    FieldOption::new("Linen", "crumpled natural linen"),
                    FieldOption::new("Paper", "solid colored paper"),
                ],
            ),
            Field::radio(
                "arrangementStyle",
                "Arrangement style",
                vec![
                    FieldOption::new("Grid", "neatly organized grid"),
                    FieldOption::new("Organic", "organic scattered arrangement"),
                    FieldOption::new("Hero", "centered hero composition"),
                ],
            ),
            Field::textarea("complementaryItems", "Complementary items", 2)
                .placeholder("e.g. sunglasses, a passport, a linen hat"),
            Field::radio(
                "includeHeadline",
                "Add headline text?",
                vec![
                    FieldOption::new("No", "no"),
                    FieldOption::new("Yes", "yes"),
                ],
            ),
            Field::text("headline", "Headline text")
                .show_if(ShowIf::equals("includeHeadline", "yes")),
        ],
    )
    .described("Lay everything out as seen from above.")];

    TemplateConfig::new(
        TemplateId::FlatLay,
        "Flat Lay",
        "A top-down arrangement of your product with complementary items.",
        steps,
        |v| {
            let headline = if v.get("includeHeadline") == Some("yes") {
                optional_sentence(v, "headline", |h| {
                    format!(
                        " Include the headline text \"{}\" in clean, legible typography.",
                        h
                    )
                })
            } else {
                String::new()
            };
            format!(
                "A top-down flat lay photograph featuring {} ({}) as the hero item on {}, in a {} \
                 alongside {}.{} Shot directly from above in {} orientation with even, soft \
                 lighting.",
                v.text(keys::PRODUCT_NAME),
                v.text(keys::PRODUCT_DESCRIPTION),
                v.text("surface"),
                v.text("arrangementStyle"),
                v.text("complementaryItems"),
                headline,
                v.text(keys::ORIENTATION),
            )
        },
    )
}
