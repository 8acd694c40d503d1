//! Instructions and request context for the planner and explainer stages.

use std::fmt::Write;
use trellis_dsl::{ComponentRegistry, Plan, ValidationError};

use crate::domain::session::HistoryEntry;

const PLANNER_RULES: &str = r#"You are a UI layout planner. Turn the user's description of a UI into a structured JSON plan.

CRITICAL RULES:
1. Use ONLY components from the list below. No exceptions.
2. Never invent new components.
3. Never add CSS, styles or Tailwind classes.
4. Never use HTML tags directly.
5. Output ONLY valid JSON. No markdown fences, no commentary.

STATIC UI ONLY:
- This generator produces static UI. It cannot express state, logic, event handlers or interactivity.
- If the user asks for auto-slide, timers, animations, submitting forms or API calls, politely refuse that part in your explanation and produce a static version instead.
- Do not fake interactivity with buttons that do nothing.
- The `onClick` prop is descriptive only; it never executes code.
- If the user asks for a component that is NOT in the list (such as "Carousel", "Slider" or "DatePicker"), politely REFUSE that part and say the component does not exist. Do not assemble it from other components unless the user explicitly asks for a custom build.
- A request for a "Carousel" is answered with NO: it is not available.
"#;

const PLANNER_FORMAT: &str = r#"OUTPUT FORMAT:
Return a JSON object of this shape:
{
  "layout": {
    "type": "ComponentName",
    "props": { ... },
    "children": [ ... ]
  }
}

Each entry of "children" is either:
- A string (text content)
- Another component object with "type", "props" and optionally "children"

EXAMPLE:
User: "A login form with email and password"
{
  "layout": {
    "type": "Container",
    "props": {},
    "children": [
      {
        "type": "Card",
        "props": { "title": "Login" },
        "children": [
          {
            "type": "Flex",
            "props": { "direction": "column", "gap": "md" },
            "children": [
              { "type": "Input", "props": { "label": "Email", "type": "email", "placeholder": "Enter your email" } },
              { "type": "Input", "props": { "label": "Password", "type": "password", "placeholder": "Enter your password" } },
              { "type": "Button", "props": { "children": "Sign In", "variant": "primary" } }
            ]
          }
        ]
      }
    ]
  }
}

Remember: output ONLY the JSON. No text before or after it.

DESIGN GUIDELINES:
- Avoid empty Cards. A Card titled "Analytics" should hold a Chart or a large Typography figure.
- A "Dashboard" gets meaningful content (Charts, stats, Tables), not empty placeholders.
- Use Flex and Grid for responsive layouts.

LAYOUT STANDARDS:
- Dashboard: start with Navbar, then Container. Inside the Container put a Typography (h2) title, then a Grid (columns 2 or 3) of Cards and Charts.
- Collections of Cards: ALWAYS use Grid. Never use Flex for main content grids, it produces uneven widths.
- Charts: ALWAYS inside a Card.
- Equal widths require Grid.

PRESERVATION RULES (MODIFICATIONS):
1. Do not delete existing components unless the user explicitly asks to remove, delete or clear them.
2. New features are APPENDED to the existing layout (for example inside the main Container). Do not replace the Navbar or other existing parts.
3. Keep existing data and props unless the user asks to change them.
4. Use ONLY listed components. Do not invent "Header", "Footer", "Hero" and the like; build them from Flex, Typography and Card."#;

/// Instructions for the explanation stage
pub const EXPLAINER_INSTRUCTIONS: &str = r#"You are a UI design explainer. Given a user's request and the JSON layout plan created for it, explain the design decisions in plain English.

RULES:
1. Be concise and friendly, like a colleague walking through their work.
2. Name the specific components used and why they were chosen.
3. For a modification, say what changed and what stayed the same.
4. Use bullet points.
5. Keep it short: 3 to 6 bullet points at most.
6. Never output code fences, JSON or code.
7. CRITICAL: describe only what is ACTUALLY in the plan. Do not claim charts, forms or data that the plan's components do not contain. An empty Card has no chart."#;

const BREVITY_MARKERS: [&str; 4] = ["short", "concise", "one line", "brief"];

/// System instructions for the planner stage, embedding the registry's component list
pub fn planner_instructions(registry: &ComponentRegistry) -> String {
    format!("{}\n{}\n{}", PLANNER_RULES, registry.describe_for_prompt(), PLANNER_FORMAT)
}

/// Request context for the planner stage
pub fn planner_context(prompt: &str, history: &[HistoryEntry], live_plan: Option<&Plan>) -> String {
    let mut context = String::new();

    if !history.is_empty() {
        context.push_str("CONVERSATION HISTORY:\n");
        for entry in history {
            let _ = writeln!(context, "{}: {}", entry.role, entry.content);
        }
        context.push('\n');
    }

    match live_plan {
        Some(plan) => {
            let _ = write!(
                context,
                "CURRENT UI PLAN (modify this based on the new request, do NOT start from scratch unless the user asks for a completely new UI):\n{}\n\n",
                pretty_json(plan)
            );
            let _ = writeln!(context, "USER'S MODIFICATION REQUEST: {}", prompt);
            context.push_str(
                "\nCRITICAL INSTRUCTION: You are MODIFYING an existing layout.\n\
                 - PRESERVE the existing structure (Navbar, etc.) unless told to remove it.\n\
                 - When adding something, INSERT it in the appropriate place (e.g. inside the main Container).\n\
                 - Output the COMPLETE updated plan, including unchanged parts.",
            );
        }
        None => {
            let _ = write!(context, "USER'S UI REQUEST: {}", prompt);
        }
    }

    context
}

/// Planner context for the retry after unparseable output
pub fn json_correction(context: &str) -> String {
    format!(
        "{}\n\nYour previous output was not valid JSON.\n\nReturn ONLY the JSON plan object, with no text or code fences around it.",
        context
    )
}

/// Planner context for the retry after a plan that failed validation
pub fn validation_correction(context: &str, errors: &[ValidationError]) -> String {
    let itemized: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    format!(
        "{}\n\nYour previous output had these errors:\n{}\n\nPlease fix and return valid JSON using ONLY allowed components.",
        context,
        itemized.join("\n")
    )
}

/// Request context for the explanation stage
pub fn explainer_context(prompt: &str, plan: &Plan, is_modification: bool) -> String {
    let mut context = format!("User's request: \"{}\"\n\n", prompt);
    let _ = write!(context, "Layout plan:\n{}\n\n", pretty_json(plan));

    if is_modification {
        context.push_str("This was a MODIFICATION of an existing UI. Explain what changed and what was kept.\n");
    } else {
        context.push_str("This is a NEW UI. Explain the layout and component choices.\n");
    }

    if wants_brevity(prompt) {
        context.push_str(
            "\nIMPORTANT: The user explicitly asked for a SHORT/CONCISE explanation. Ignore the bullet point rule if needed and give a single sentence or a very brief summary.",
        );
    }

    context
}

fn wants_brevity(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    BREVITY_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn pretty_json(plan: &Plan) -> String {
    serde_json::to_string_pretty(plan).unwrap_or_else(|_| "{}".to_string())
}
