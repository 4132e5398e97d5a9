//! Normalization of user-entered component fields before they are stored.
//!
//! Resistors are stored without the Ohm suffix, capacitors in their natural
//! unit (`100nF`, not `0.1uF`), and common package names in one spelling,
//! so that search and equivalence matching see consistent values.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::component::Component;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid cleanup pattern")
}

static RESISTOR_PPM: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)[,;]\s*(\d+\s*ppm)"));
static RESISTOR_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| regex(r"[,;]\s*((?:\+/-\s*)?(?:0?\.)?\d+%)"));
static RESISTOR_WATT: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(?i)[,;]\s*((?:(?:\d*\.)?\d+|\d+/\d+)\s*W(?:att)?)")
});
static OHM: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\s*ohm"));
static TRAILING_KILO: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\s*k$"));

static TO_PACKAGE: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)^to-?(\d+)"));
static INLINE_PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(?i)^(?:(\d+)[ -]?)?p?([sd])i[lp][ -]?(\d+)?")
});

static FARAD_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(?i)^((?:\d*\.)?\d+)\s*([uµnp])F(.*)$")
});
static THREE_DIGIT_CODE: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)^(\d\d)(\d)\s*([dfghjkmpz])?$"));

/// Trim surrounding whitespace and use plain newlines.
pub fn clean_string(input: &str) -> String {
    input.trim().replace("\r\n", "\n")
}

/// Clean up all fields, then apply category-specific rules.
///
/// # Examples
///
/// ```
/// use stuffstore::{Component, cleanup::cleanup_component};
///
/// let mut c = Component::new(1);
/// c.category = "Capacitor (C)".into();
/// c.value = " 0.1uF ".into();
/// cleanup_component(&mut c);
/// assert_eq!(c.value, "100nF");
/// ```
pub fn cleanup_component(component: &mut Component) {
    component.value = clean_string(&component.value);
    component.category = clean_string(&component.category);
    component.description = clean_string(&component.description);
    component.quantity = clean_string(&component.quantity);
    component.notes = clean_string(&component.notes);
    component.datasheet_url = clean_string(&component.datasheet_url);
    cleanup_footprint(component);

    match component.category.as_str() {
        "Resistor" => cleanup_resistor(component),
        "Capacitor (C)" | "Aluminum Cap" => cleanup_capacitor(component),
        _ => {}
    }
}

fn prepend_description(component: &mut Component, note: &str) {
    if component.description.is_empty() {
        component.description = note.to_string();
    } else {
        component.description = format!("{note}; {}", component.description);
    }
}

/// Move a matched annotation from the value into the description.
fn move_to_description(
    component: &mut Component,
    pattern: &Regex,
    normalize: fn(&str) -> String,
) {
    let Some(note) = pattern
        .captures(&component.value)
        .map(|caps| normalize(&caps[1]))
    else {
        return;
    };
    prepend_description(component, &note);
    component.value = pattern.replace_all(&component.value, "").into_owned();
}

fn cleanup_resistor(component: &mut Component) {
    move_to_description(component, &RESISTOR_PPM, str::to_lowercase);
    move_to_description(component, &RESISTOR_PERCENT, str::to_string);
    move_to_description(component, &RESISTOR_WATT, str::to_string);

    component.value = OHM.replace_all(&component.value, "").into_owned();
    component.value =
        TRAILING_KILO.replace_all(&component.value, "k").into_owned();

    component.description = clean_string(&component.description);
    component.value = clean_string(&component.value);
}

fn cleanup_footprint(component: &mut Component) {
    let footprint = clean_string(&component.footprint);
    let footprint = TO_PACKAGE.replace(&footprint, "TO-$1");
    let footprint = INLINE_PACKAGE.replace(&footprint, |caps: &Captures| {
        let field = |i| caps.get(i).map_or("", |m| m.as_str());
        format!("{}IP-{}{}", field(2), field(1), field(3)).to_uppercase()
    });
    component.footprint = footprint.into_owned();
}

/// Format with one decimal, dropping a trailing `.0`.
fn format_one_decimal(value: f64) -> String {
    let formatted = format!("{value:.1}");
    match formatted.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => formatted,
    }
}

fn capacitance_string(farad: f64) -> String {
    if farad < 1000e-12 {
        format!("{}pF", format_one_decimal(farad * 1e12))
    } else if farad < 1000e-9 {
        format!("{}nF", format_one_decimal(farad * 1e9))
    } else {
        format!("{}uF", format_one_decimal(farad * 1e6))
    }
}

fn capacitor_tolerance(letter: &str) -> Option<&'static str> {
    let tolerance = match letter.to_lowercase().as_str() {
        "d" => "+/- 0.5pF",
        "f" => "+/- 1%",
        "g" => "+/- 2%",
        "h" => "+/- 3%",
        "j" => "+/- 5%",
        "k" => "+/- 10%",
        "m" => "+/- 20%",
        "p" => "+100%,-0%",
        "z" => "+80%,-20%",
        _ => return None,
    };
    Some(tolerance)
}

fn cleanup_capacitor(component: &mut Component) {
    if let Some(caps) = FARAD_VALUE.captures(&component.value) {
        let factor = match &caps[2] {
            "n" | "N" => 1e-9,
            "p" | "P" => 1e-12,
            _ => 1e-6,
        };
        let Ok(number) = caps[1].parse::<f64>() else {
            return;
        };
        let trailing = clean_string(&caps[3]);
        component.value = capacitance_string(number * factor);
        if !trailing.is_empty() {
            prepend_description(component, &trailing);
        }
    } else if let Some(caps) = THREE_DIGIT_CODE.captures(&component.value) {
        let (Ok(significand), Ok(magnitude)) =
            (caps[1].parse::<f64>(), caps[2].parse::<i32>())
        else {
            return;
        };
        if magnitude > 6 {
            return;
        }
        let tolerance = caps.get(3).and_then(|m| capacitor_tolerance(m.as_str()));
        component.value =
            capacitance_string(significand * 10f64.powi(magnitude) * 1e-12);
        if let Some(tolerance) = tolerance {
            prepend_description(component, tolerance);
        }
    }
}
