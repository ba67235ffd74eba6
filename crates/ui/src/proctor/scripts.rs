use assess_core::guard::{BLOCKED_BARE, BLOCKED_WITH_MODIFIER, BLOCKED_WITH_MODIFIER_SHIFT};

fn js_array(values: &[&str]) -> String {
    let items = values
        .iter()
        .map(|value| format!("{value:?}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{items}]")
}

/// Installs the guard listeners once per page. They stay disarmed until
/// [`arm_script`] runs and post every observation through `dioxus.send`.
/// Suppression happens here, synchronously; the Rust guard only counts.
#[must_use]
pub fn install_script() -> String {
    format!(
        r#"(function() {{
    const previous = window.__assessGuard;
    if (previous && previous.teardown) previous.teardown();
    const state = {{ armed: false, unloadPrompt: false, handlers: [] }};
    window.__assessGuard = state;
    const withModifier = {with_modifier};
    const withModifierShift = {with_modifier_shift};
    const bare = {bare};
    const blocked = (e) => {{
        if (bare.includes(e.key)) return true;
        if (!(e.ctrlKey || e.metaKey)) return false;
        const key = (e.key || "").toLowerCase();
        return withModifier.includes(key) || (e.shiftKey && withModifierShift.includes(key));
    }};
    const on = (target, name, handler, capture) => {{
        target.addEventListener(name, handler, capture);
        state.handlers.push([target, name, handler, capture]);
    }};
    const forward = (message) => {{
        if (state.armed) dioxus.send(message);
    }};
    const suppress = (type) => (e) => {{
        if (!state.armed) return;
        e.preventDefault();
        forward({{ type }});
    }};
    on(document, "contextmenu", suppress("context_menu"), true);
    on(document, "copy", suppress("copy"), true);
    on(document, "cut", suppress("cut"), true);
    on(document, "paste", suppress("paste"), true);
    on(document, "selectstart", suppress("select_start"), true);
    on(document, "keydown", (e) => {{
        if (!state.armed || !blocked(e)) return;
        e.preventDefault();
        e.stopPropagation();
        forward({{ type: "key_down", key: e.key, ctrl: e.ctrlKey, meta: e.metaKey, shift: e.shiftKey }});
    }}, true);
    on(document, "visibilitychange", () => forward({{ type: "visibility", hidden: document.hidden }}), false);
    on(window, "blur", () => forward({{ type: "blur" }}), false);
    on(window, "focus", () => forward({{ type: "focus" }}), false);
    on(document.documentElement, "mouseleave", (e) => {{
        forward({{ type: "pointer_leave", has_related_target: !!e.relatedTarget }});
    }}, false);
    on(document.documentElement, "mouseenter", () => forward({{ type: "pointer_enter" }}), false);
    on(window, "beforeunload", (e) => {{
        if (!state.armed || !state.unloadPrompt) return;
        e.preventDefault();
        e.returnValue = "";
        forward({{ type: "before_unload" }});
    }}, false);
    on(document, "fullscreenchange", () => {{
        dioxus.send({{ type: "fullscreen", active: !!document.fullscreenElement }});
    }}, false);
    state.teardown = () => {{
        for (const [target, name, handler, capture] of state.handlers) {{
            target.removeEventListener(name, handler, capture);
        }}
        state.handlers = [];
        state.armed = false;
        state.unloadPrompt = false;
        document.body.style.userSelect = "";
    }};
}})();"#,
        with_modifier = js_array(&BLOCKED_WITH_MODIFIER),
        with_modifier_shift = js_array(&BLOCKED_WITH_MODIFIER_SHIFT),
        bare = js_array(&BLOCKED_BARE),
    )
}

/// Removes every listener installed by [`install_script`].
pub const TEARDOWN_SCRIPT: &str = r"(function() {
    const state = window.__assessGuard;
    if (state && state.teardown) state.teardown();
    window.__assessGuard = undefined;
})();";

#[must_use]
pub fn arm_script(armed: bool) -> String {
    format!(
        r"(function() {{
    const state = window.__assessGuard;
    if (state) state.armed = {armed};
}})();"
    )
}

#[must_use]
pub fn text_selection_script(enabled: bool) -> String {
    let value = if enabled { "" } else { "none" };
    format!(r#"document.body.style.userSelect = "{value}";"#)
}

#[must_use]
pub fn unload_prompt_script(enabled: bool) -> String {
    format!(
        r"(function() {{
    const state = window.__assessGuard;
    if (state) state.unloadPrompt = {enabled};
}})();"
    )
}

/// Drops any selection and moves focus to the warning's acknowledge button
/// once it has rendered.
pub const FOCUS_WARNING_SCRIPT: &str = r#"(function() {
    const selection = window.getSelection && window.getSelection();
    if (selection) selection.removeAllRanges();
    requestAnimationFrame(() => document.getElementById("proctor-acknowledge")?.focus());
})();"#;

/// Resolves to `true` when the document is fullscreen afterwards.
pub const REQUEST_FULLSCREEN_SCRIPT: &str = r"
    if (document.fullscreenElement) return true;
    const el = document.documentElement;
    if (!el.requestFullscreen) return false;
    try {
        await el.requestFullscreen();
        return true;
    } catch (_) {
        return false;
    }
";

pub const EXIT_FULLSCREEN_SCRIPT: &str = r"
    if (document.fullscreenElement && document.exitFullscreen) {
        try { await document.exitFullscreen(); } catch (_) {}
    }
";
