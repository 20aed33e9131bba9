//! Markup half of the widget binder.
//!
//! Turns placeholder tokens into interactive control markup. The rendered
//! `<input>` carries the bound element id, the owning region's marker and the
//! checkbox id as data attributes so the listener half can find its way back
//! from a change event. Listener attachment itself is platform work and lives
//! in the browser crate.

use smol_str::SmolStr;
use std::collections::HashMap;

use crate::markup::find_placeholder;

/// CSS class carried by every rendered control, for host styling.
pub const CONTROL_CLASS: &str = "tickbox-control";

/// Attribute naming the owning region on a rendered control.
pub const CONTROL_REGION_ATTR: &str = "data-tickbox-region";

/// Attribute naming the checkbox on a rendered control.
pub const CONTROL_CHECKBOX_ATTR: &str = "data-tickbox-checkbox";

/// Render every placeholder in the tagged text as control markup.
///
/// Element ids come from the supplied binding map (checkbox id to element
/// id), so rendering is deterministic for a fixed binding: recomputing with
/// unchanged bindings reproduces the previous markup byte for byte, which is
/// what makes re-render suppression work. Placeholders without a binding are
/// rendered with the checkbox id itself; callers that are about to write the
/// result into the live node bind fresh element ids first.
pub fn render_controls(
    tagged: &str,
    region_id: &str,
    bindings: &HashMap<SmolStr, SmolStr>,
) -> String {
    let mut out = String::with_capacity(tagged.len());
    let mut offset = 0;

    while let Some((range, ph)) = find_placeholder(&tagged[offset..]) {
        out.push_str(&tagged[offset..offset + range.start]);

        let element_id = bindings.get(&ph.id).unwrap_or(&ph.id);
        out.push_str(&format!(
            "<input type=\"checkbox\" id=\"{element_id}\" class=\"{CONTROL_CLASS}\" \
             {CONTROL_REGION_ATTR}=\"{region_id}\" {CONTROL_CHECKBOX_ATTR}=\"{}\"{}>",
            ph.id,
            if ph.checked { " checked=\"checked\"" } else { "" },
        ));

        offset += range.end;
    }
    out.push_str(&tagged[offset..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::tokenize;
    use smol_str::ToSmolStr;

    #[test]
    fn test_render_controls_states() {
        let out = tokenize("_[ ] a\n_[x] b");
        let html = render_controls(&out.tagged, "r1", &HashMap::new());

        let first = html.find(&format!("{CONTROL_CHECKBOX_ATTR}=\"{}\"", out.created[0].id));
        let second = html.find(&format!("{CONTROL_CHECKBOX_ATTR}=\"{}\"", out.created[1].id));
        // both rendered, in source order
        assert!(first.unwrap() < second.unwrap());

        assert_eq!(html.matches("type=\"checkbox\"").count(), 2);
        assert_eq!(html.matches("checked=\"checked\"").count(), 1);
        assert!(html.contains(&format!("{CONTROL_REGION_ATTR}=\"r1\"")));
        assert!(html.contains("a\n"));
        assert!(html.ends_with(" b"));
    }

    #[test]
    fn test_render_controls_deterministic() {
        let out = tokenize("x _[ ] y");
        let mut bindings = HashMap::new();
        bindings.insert(out.created[0].id.clone(), "e1".to_smolstr());

        let a = render_controls(&out.tagged, "r1", &bindings);
        let b = render_controls(&out.tagged, "r1", &bindings);
        assert_eq!(a, b);
        assert!(a.contains("id=\"e1\""));
    }

    #[test]
    fn test_render_controls_no_placeholders() {
        assert_eq!(
            render_controls("plain text", "r1", &HashMap::new()),
            "plain text"
        );
    }
}
