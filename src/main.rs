//! Tic-tac-toe entry point
//!
//! Handles platform-specific initialization and wires UI events to the game.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, Event, HtmlInputElement};

    use tictactoe_history::platform::default_store;
    use tictactoe_history::{GameEngine, Greeting, Settings};

    /// App instance holding all state
    struct App {
        game: GameEngine,
        greeting: Greeting,
    }

    impl App {
        /// Push current state into the DOM
        fn render(&self, document: &Document) {
            if let Some(el) = document.get_element_by_id("greeting") {
                el.set_text_content(Some(&self.greeting.message()));
            }

            let view = self.game.view();

            if let Some(el) = document.get_element_by_id("status") {
                el.set_text_content(Some(&view.status));
            }

            if let Ok(squares) = document.query_selector_all(".square") {
                for i in 0..squares.length() {
                    let Some(el) = squares.item(i).and_then(|n| n.dyn_into::<Element>().ok())
                    else {
                        continue;
                    };
                    let mark = view
                        .squares
                        .get(i as usize)
                        .copied()
                        .flatten()
                        .map(|p| p.as_str())
                        .unwrap_or("");
                    el.set_text_content(Some(mark));
                }
            }

            // Rebuild the history list
            if let Some(list) = document.get_element_by_id("history") {
                list.set_inner_html("");
                for entry in &view.history {
                    let (Ok(item), Ok(button)) =
                        (document.create_element("li"), document.create_element("button"))
                    else {
                        continue;
                    };
                    button.set_text_content(Some(&entry.label));
                    let _ = button.set_attribute("data-history", &entry.index.to_string());
                    if entry.is_current {
                        let _ = button.set_attribute("disabled", "");
                    }
                    let _ = item.append_child(&button);
                    let _ = list.append_child(&item);
                }
            }
        }
    }

    /// `data-*` index on the element that received the event
    fn event_index(event: &Event, attribute: &str) -> Option<usize> {
        event
            .target()?
            .dyn_into::<Element>()
            .ok()?
            .get_attribute(attribute)?
            .parse()
            .ok()
    }

    fn listen(element: &Element, event: &str, handler: impl FnMut(Event) + 'static) {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        let _ = element.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Tic-tac-toe starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document available");
            return;
        };

        let store = default_store();
        let settings = Settings::load(&*store);
        // Write back so the keys are visible (and editable) in LocalStorage
        settings.save(&*store);
        let app = Rc::new(RefCell::new(App {
            game: GameEngine::new(store.clone(), &settings),
            greeting: Greeting::new(store, &settings),
        }));

        // Name input
        if let Some(input) = document
            .get_element_by_id("name")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(app.borrow().greeting.name());
            let app = app.clone();
            let doc = document.clone();
            listen(&input, "input", move |event| {
                let Some(input) = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                else {
                    return;
                };
                let mut a = app.borrow_mut();
                a.greeting.on_name_changed(&input.value());
                a.render(&doc);
            });
        }

        // Board squares (delegated)
        if let Some(board) = document.get_element_by_id("board") {
            let app = app.clone();
            let doc = document.clone();
            listen(&board, "click", move |event| {
                let Some(square) = event_index(&event, "data-square") else {
                    return;
                };
                let mut a = app.borrow_mut();
                if let Err(err) = a.game.select_square(square) {
                    log::error!("{}", err);
                }
                a.render(&doc);
            });
        }

        // History panel (delegated)
        if let Some(list) = document.get_element_by_id("history") {
            let app = app.clone();
            let doc = document.clone();
            listen(&list, "click", move |event| {
                let Some(index) = event_index(&event, "data-history") else {
                    return;
                };
                let mut a = app.borrow_mut();
                if let Err(err) = a.game.jump_to(index) {
                    log::error!("{}", err);
                }
                a.render(&doc);
            });
        }

        // Restart button
        if let Some(button) = document.get_element_by_id("restart") {
            let app = app.clone();
            let doc = document.clone();
            listen(&button, "click", move |_event| {
                let mut a = app.borrow_mut();
                a.game.restart();
                a.render(&doc);
            });
        }

        app.borrow().render(&document);
        log::info!("Tic-tac-toe running!");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tic-tac-toe (native) starting...");
    log::info!("Native mode keeps state in memory - run with `trunk serve` for the web version");

    println!("\nPlaying demo game...");
    demo_game();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted game exercising moves, time travel and branching
#[cfg(not(target_arch = "wasm32"))]
fn demo_game() {
    use tictactoe_history::platform::default_store;
    use tictactoe_history::{GameEngine, Greeting, Settings};

    let store = default_store();
    let settings = Settings::load(&*store);
    settings.save(&*store);

    let mut greeting = Greeting::new(store.clone(), &settings);
    println!("{}", greeting.message());
    greeting.on_name_changed("Player One");
    println!("{}", greeting.message());

    let mut game = GameEngine::new(store, &settings);
    for square in [4, 0, 8, 2] {
        if let Err(err) = game.select_square(square) {
            log::error!("{}", err);
        }
    }
    println!("\n{}\n{}", game.current_board(), game.status());

    // Rewind to after X's first move and take a different line
    if let Err(err) = game.jump_to(1) {
        log::error!("{}", err);
    }
    for square in [1, 0, 7] {
        if let Err(err) = game.select_square(square) {
            log::error!("{}", err);
        }
    }
    println!("\n{}\n{}", game.current_board(), game.status());

    for entry in game.history_entries() {
        let marker = if entry.is_current { ">" } else { " " };
        println!("{} {}", marker, entry.label);
    }
}
