//! Built-in questionnaire
//!
//! Observational questions a grower can answer without lab equipment.
//! Option values are representative midpoints of the band each answer implies:
//!
//! | Criterion  | Low band      | Middle band    | High band      |
//! |------------|---------------|----------------|----------------|
//! | ph         | 5.0 (4.5-5.5) | 6.0-6.5        | 7.0 (6.5-7.5)  |
//! | rain       | 800 (<1000)   | 1500           | 2500 (>2000)   |
//! | temp       | 18 (<20 °C)   | 25             | 32 (>30 °C)    |
//! | sun        | 0.3           | 0.6            | 1.0            |
//! | irrigation | 0.3           | 0.6            | 1.0            |
//! | soil       | 1 = Clay      | 2 = Loam       | 3 = Sandy      |

use super::{OptionValue, Question, QuestionOption, Questionnaire};
use crate::criteria::Criterion;

fn option(code: &str, label: &str, description: &str, value: OptionValue) -> QuestionOption {
    QuestionOption {
        value_code: code.to_string(),
        label: label.to_string(),
        description: description.to_string(),
        value,
    }
}

fn measure(code: &str, label: &str, description: &str, value: f64) -> QuestionOption {
    option(code, label, description, OptionValue::Measure(value))
}

fn soil(code: &str, label: &str, description: &str, proxy: u8) -> QuestionOption {
    option(code, label, description, OptionValue::SoilProxy(proxy))
}

fn question(id: &str, text: &str, category: Criterion, options: Vec<QuestionOption>) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        category,
        options,
    }
}

pub fn standard_questionnaire() -> Questionnaire {
    Questionnaire::new(vec![
        // ====================================================================
        // Soil acidity
        // ====================================================================
        question(
            "q_ph_1",
            "What do you see on the soil surface after a dry spell?",
            Criterion::Ph,
            vec![
                measure("A", "Whitish crust or lime fragments", "Neutral to alkaline soil (pH 6.5 - 7.5)", 7.0),
                measure("B", "Ordinary brown soil, nothing notable", "Slightly acidic soil (pH 5.5 - 6.5)", 6.0),
                measure("C", "Dark, spongy, peat-like soil", "Acidic soil (pH 4.5 - 5.5)", 5.0),
            ],
        ),
        question(
            "q_ph_2",
            "How does the soil smell when freshly dug?",
            Criterion::Ph,
            vec![
                measure("A", "Sour, often waterlogged", "Acidic soil (pH 4.5 - 5.5)", 5.0),
                measure("B", "Mild and earthy", "Slightly acidic to neutral soil (pH 6.0 - 7.0)", 6.5),
                measure("C", "Almost no smell, dry and chalky", "Neutral to alkaline soil (pH 6.5 - 7.5)", 7.0),
            ],
        ),
        question(
            "q_ph_3",
            "Which weeds dominate the plot?",
            Criterion::Ph,
            vec![
                measure("A", "Sedges, ferns and moss", "Acidic soil (pH 4.5 - 5.5)", 5.0),
                measure("B", "A mix of common grasses", "Slightly acidic soil (pH 5.5 - 6.5)", 6.0),
                measure("C", "Clover, chickweed and thistle", "Neutral to alkaline soil (pH 6.5 - 7.5)", 7.0),
            ],
        ),
        // ====================================================================
        // Rainfall
        // ====================================================================
        question(
            "q_rain_1",
            "How often does it rain in your area over a year?",
            Criterion::Rain,
            vec![
                measure("A", "Rarely, the land is often dry", "Low rainfall (< 1000 mm/year)", 800.0),
                measure("B", "Balanced wet and dry seasons", "Moderate rainfall (1000 - 2000 mm/year)", 1500.0),
                measure("C", "Rain almost all year round", "High rainfall (> 2000 mm/year)", 2500.0),
            ],
        ),
        question(
            "q_rain_2",
            "How long does the dry season last?",
            Criterion::Rain,
            vec![
                measure("A", "More than six months", "Low rainfall (< 1000 mm/year)", 800.0),
                measure("B", "Three to six months", "Moderate rainfall (1000 - 2000 mm/year)", 1500.0),
                measure("C", "Less than three months", "High rainfall (> 2000 mm/year)", 2500.0),
            ],
        ),
        // ====================================================================
        // Temperature
        // ====================================================================
        question(
            "q_temp_1",
            "How would you describe the usual air temperature?",
            Criterion::Temp,
            vec![
                measure("A", "Cool to cold", "Mean temperature < 20°C", 18.0),
                measure("B", "Warm", "Mean temperature 20°C - 30°C", 25.0),
                measure("C", "Hot", "Mean temperature > 30°C", 32.0),
            ],
        ),
        question(
            "q_temp_2",
            "Where is the plot located?",
            Criterion::Temp,
            vec![
                measure("A", "Highlands or mountain slopes", "Mean temperature < 20°C", 18.0),
                measure("B", "Foothills or inland plains", "Mean temperature 20°C - 30°C", 25.0),
                measure("C", "Coastal lowlands", "Mean temperature > 30°C", 32.0),
            ],
        ),
        // ====================================================================
        // Sunlight
        // ====================================================================
        question(
            "q_sun_1",
            "How much sunlight reaches the plot?",
            Criterion::Sun,
            vec![
                measure("A", "Often cloudy or shaded by trees/buildings", "Low intensity", 0.3),
                measure("B", "Enough, with some shade during the day", "Medium intensity", 0.6),
                measure("C", "Full sun all day", "High intensity", 1.0),
            ],
        ),
        question(
            "q_sun_2",
            "How many hours of direct sun does the plot get on a clear day?",
            Criterion::Sun,
            vec![
                measure("A", "Fewer than 4 hours", "Low intensity", 0.3),
                measure("B", "4 to 7 hours", "Medium intensity", 0.6),
                measure("C", "More than 7 hours", "High intensity", 1.0),
            ],
        ),
        // ====================================================================
        // Irrigation
        // ====================================================================
        question(
            "q_irr_1",
            "How easy is it to get water for the crops?",
            Criterion::Irrigation,
            vec![
                measure("A", "Difficult, rain only", "Low availability", 0.3),
                measure("B", "A well or small stream nearby", "Medium availability", 0.6),
                measure("C", "Reliable irrigation channel or large water source", "High availability", 1.0),
            ],
        ),
        question(
            "q_irr_2",
            "What is your main water source in the dry season?",
            Criterion::Irrigation,
            vec![
                measure("A", "None, the plot waits for rain", "Low availability", 0.3),
                measure("B", "Hand-carried or pumped from a well", "Medium availability", 0.6),
                measure("C", "Piped or canal irrigation", "High availability", 1.0),
            ],
        ),
        // ====================================================================
        // Soil texture
        // ====================================================================
        question(
            "q_soil_1",
            "What is the texture of the soil?",
            Criterion::Soil,
            vec![
                soil("A", "Sticky when wet, hard when dry", "Clay soil", 1),
                soil("B", "Crumbly and easy to hoe", "Loam soil", 2),
                soil("C", "Coarse, water soaks in quickly", "Sandy soil", 3),
            ],
        ),
        question(
            "q_soil_2",
            "How quickly does water drain after heavy rain?",
            Criterion::Soil,
            vec![
                soil("A", "Puddles remain for days", "Clay soil", 1),
                soil("B", "Drains within a few hours", "Loam soil", 2),
                soil("C", "Disappears almost immediately", "Sandy soil", 3),
            ],
        ),
    ])
}
