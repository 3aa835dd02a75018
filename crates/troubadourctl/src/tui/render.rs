//! Rendering - one screen per wizard phase

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use troubadour_common::inventory::{gib, InventorySnapshot, StorageKind};
use troubadour_common::wizard::{Stage, StageStatus};
use troubadour_common::{Phase, PowerAction, WizardSession};

use super::layout::{bottom_strip, centered_rect, compute_review_layout};
use super::patterns::{field_colour, CalibrationPattern, ColourField};

pub const BG: Color = Color::Rgb(0x1E, 0x1E, 0x2E);
pub const FG: Color = Color::Rgb(0xCD, 0xD6, 0xF4);
pub const PRIMARY: Color = Color::Rgb(0x89, 0xB4, 0xFA);
pub const MUTED: Color = Color::Rgb(0x7F, 0x84, 0x9C);
pub const SURFACE: Color = Color::Rgb(0x45, 0x47, 0x5A);
pub const SUCCESS: Color = Color::Rgb(0xA6, 0xE3, 0xA1);
pub const ERROR: Color = Color::Rgb(0xF3, 0x8B, 0xA8);
pub const WARNING: Color = Color::Rgb(0xF9, 0xE2, 0xAF);

const TITLE: &str = "Troubadour - Hardware Qualification";

/// Draw the screen for the session's current phase. `entry` is the serial
/// being typed on the entry screen.
pub fn draw(f: &mut Frame, session: &WizardSession, entry: &str) {
    let area = f.size();
    f.render_widget(Block::default().style(Style::default().bg(BG).fg(FG)), area);

    match session.phase() {
        Phase::Init | Phase::CollectingInventory => draw_splash(f, area),
        Phase::ReviewInventory => draw_review(f, area, session),
        Phase::DisplayTest => draw_display_test(f, area, session),
        Phase::ConfirmDisplay => draw_confirm_display(f, area),
        Phase::EnterSerial | Phase::VerifyingSerial => draw_serial_entry(f, area, session, entry),
        Phase::SerialConfirmed => draw_serial_confirmed(f, area, session),
        Phase::SerialMismatch => draw_mismatch(f, area, session),
        Phase::WritingLog => draw_message(f, area, "Writing qualification record...", PRIMARY),
        Phase::Done => draw_done(f, area, session),
        Phase::FatalError => draw_fatal(f, area, session),
        Phase::Escalated => draw_escalated(f, area, session),
    }
}

fn title_style() -> Style {
    Style::default().fg(FG).add_modifier(Modifier::BOLD)
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SURFACE))
        .title(Span::styled(format!(" {} ", title), Style::default().fg(PRIMARY)))
        .style(Style::default().bg(BG).fg(FG))
}

fn dialog(f: &mut Frame, area: Rect, title: &str, accent: Color, lines: Vec<Line<'_>>) {
    let rect = centered_rect(60, 50, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(BG).fg(FG));
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false }),
        rect,
    );
}

fn key_hint<'a>(keys: &'a str, action: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(keys, Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)),
        Span::raw(" - "),
        Span::raw(action),
    ])
}

fn draw_message(f: &mut Frame, area: Rect, text: &str, colour: Color) {
    let rect = centered_rect(60, 20, area);
    f.render_widget(
        Paragraph::new(Line::styled(text, Style::default().fg(colour)))
            .alignment(Alignment::Center),
        rect,
    );
}

fn draw_splash(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::styled("Troubadour", title_style()),
        Line::styled("Hardware Qualification", Style::default().fg(MUTED)),
        Line::raw(""),
        Line::styled("Collecting hardware inventory...", Style::default().fg(PRIMARY)),
        Line::raw(""),
        Line::styled("Esc - Quit", Style::default().fg(MUTED)),
    ];
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered_rect(60, 40, area),
    );
}

fn draw_review(f: &mut Frame, area: Rect, session: &WizardSession) {
    let layout = compute_review_layout(area);
    f.render_widget(
        Paragraph::new(Line::styled(TITLE, title_style())).alignment(Alignment::Center),
        layout.header,
    );

    if let Some(snapshot) = session.snapshot() {
        f.render_widget(
            Paragraph::new(processor_memory_lines(snapshot))
                .block(panel("Processor & Memory"))
                .wrap(Wrap { trim: true }),
            layout.columns[0],
        );
        f.render_widget(
            Paragraph::new(gpu_network_lines(snapshot))
                .block(panel("Graphics & Network"))
                .wrap(Wrap { trim: true }),
            layout.columns[1],
        );
        f.render_widget(
            Paragraph::new(storage_lines(snapshot))
                .block(panel("Storage"))
                .wrap(Wrap { trim: true }),
            layout.columns[2],
        );
    }

    if layout.progress.height > 0 {
        f.render_widget(
            Paragraph::new(progress_lines(session)).block(panel("Stage progress")),
            layout.progress,
        );
        let hotkeys = vec![
            key_hint("Y/Enter", "Continue to display test"),
            key_hint("Q/Esc", "Quit"),
        ];
        f.render_widget(Paragraph::new(hotkeys).block(panel("Hotkeys")), layout.hotkeys);
    }

    f.render_widget(
        Paragraph::new(Line::styled(
            "Stage 1/4: Inventory collection - complete",
            Style::default().fg(SUCCESS),
        ))
        .alignment(Alignment::Center),
        layout.status_bar,
    );
}

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(MUTED)),
        Span::raw(if value.is_empty() { "unknown".to_string() } else { value }),
    ])
}

fn heading(text: &str) -> Line<'_> {
    Line::styled(text, Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD))
}

pub fn processor_memory_lines(snapshot: &InventorySnapshot) -> Vec<Line<'static>> {
    let cpu = &snapshot.processor;
    let mem = &snapshot.memory;
    let mut lines = vec![
        heading("Processor"),
        field("Model", cpu.model.clone()),
        field("Cores / threads", format!("{} / {}", cpu.cores, cpu.threads)),
        field("Frequency", format!("{:.0} MHz", cpu.frequency_mhz)),
        field("Cache", cpu.cache.clone()),
        field("Architecture", cpu.architecture.clone()),
        Line::raw(""),
        heading("Memory"),
        field("Total", format!("{:.1} GiB", gib(mem.total_bytes))),
        field("Speed", mem.frequency.clone()),
        field("Manufacturer", mem.manufacturer.clone()),
    ];
    for slot in &mem.slots {
        lines.push(Line::raw(format!(
            "  Slot {}: {:.0} GiB {}",
            slot.slot_number,
            gib(slot.size_bytes),
            slot.manufacturer
        )));
    }
    lines
}

pub fn gpu_network_lines(snapshot: &InventorySnapshot) -> Vec<Line<'static>> {
    let gpu = &snapshot.gpu;
    let mut lines = vec![
        heading("Graphics"),
        field("Model", gpu.model.clone()),
        field("Memory", gpu.memory.clone()),
        field("Resolution", gpu.resolution.clone()),
        field("Driver", gpu.driver.clone()),
        Line::raw(""),
        heading("Network"),
    ];
    if snapshot.network_cards.is_empty() {
        lines.push(Line::styled("No active interfaces", Style::default().fg(MUTED)));
    }
    for nic in &snapshot.network_cards {
        lines.push(Line::raw(format!("{} - {}", nic.name, nic.model)));
        lines.push(Line::styled(
            format!("  MAC {}", nic.mac_address),
            Style::default().fg(MUTED),
        ));
    }
    lines
}

pub fn storage_lines(snapshot: &InventorySnapshot) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for kind in StorageKind::ALL {
        let devices: Vec<_> = snapshot.storage_of_kind(kind).collect();
        if devices.is_empty() {
            continue;
        }
        lines.push(heading(kind.as_str()));
        for d in devices {
            lines.push(Line::raw(format!("{} ({:.1} GiB)", d.model, gib(d.size_bytes))));
            if !d.mount_point.is_empty() || !d.label.is_empty() {
                lines.push(Line::styled(
                    format!("  {} {}", d.mount_point, d.label).trim_end().to_string(),
                    Style::default().fg(MUTED),
                ));
            }
        }
    }
    if lines.is_empty() {
        lines.push(Line::styled("No storage devices found", Style::default().fg(MUTED)));
    }
    lines
}

fn status_colour(status: StageStatus) -> Color {
    match status {
        StageStatus::Pending => MUTED,
        StageStatus::InProgress => WARNING,
        StageStatus::Complete => SUCCESS,
        StageStatus::Failed => ERROR,
    }
}

pub fn progress_lines(session: &WizardSession) -> Vec<Line<'static>> {
    Stage::ALL
        .iter()
        .map(|stage| {
            let status = session.stage_status(*stage);
            Line::from(vec![
                Span::raw(format!("{}. {}: ", stage.number(), stage.label())),
                Span::styled(status.as_str(), Style::default().fg(status_colour(status))),
            ])
        })
        .collect()
}

fn draw_display_test(f: &mut Frame, area: Rect, session: &WizardSession) {
    let step = session
        .sequence_step()
        .unwrap_or_else(|| session.sequencer().step_at(std::time::Duration::ZERO));

    match field_colour(step.pattern) {
        Some(colour) => f.render_widget(ColourField(colour), area),
        None => f.render_widget(CalibrationPattern, area),
    }

    if step.held {
        let strip = bottom_strip(area, 1);
        f.render_widget(
            Paragraph::new(Line::styled(
                " Inspect the pattern, then press any key ",
                Style::default().fg(FG).bg(BG).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            strip,
        );
    }
}

fn draw_confirm_display(f: &mut Frame, area: Rect) {
    f.render_widget(CalibrationPattern, area);
    dialog(
        f,
        area,
        "Display test",
        PRIMARY,
        vec![
            Line::raw(""),
            Line::styled("Did every pattern display correctly?", title_style()),
            Line::raw(""),
            key_hint("Y/Enter", "Yes, continue"),
            key_hint("N", "No, repeat the test"),
        ],
    );
}

fn system_serial(session: &WizardSession) -> String {
    session
        .snapshot()
        .map(|s| s.serial_number.clone())
        .unwrap_or_default()
}

fn draw_serial_entry(f: &mut Frame, area: Rect, session: &WizardSession, entry: &str) {
    let verifying = session.phase() == Phase::VerifyingSerial;
    let typed = if verifying { session.entered_serial() } else { entry };
    let mut lines = vec![
        Line::raw(""),
        Line::from(vec![
            Span::styled("System serial number: ", Style::default().fg(MUTED)),
            Span::styled(system_serial(session), title_style()),
        ]),
        Line::raw(""),
        Line::raw("Enter the serial number printed on the unit label:"),
        Line::raw(""),
        Line::from(vec![
            Span::styled(
                format!(" {} ", typed),
                Style::default().fg(FG).bg(SURFACE),
            ),
            Span::styled(if verifying { " " } else { "_" }, Style::default().fg(PRIMARY)),
        ]),
        Line::raw(""),
    ];
    if session.failed_serial_attempts() > 0 {
        lines.push(Line::styled(
            format!("Previous attempts: {}", session.failed_serial_attempts()),
            Style::default().fg(WARNING),
        ));
    }
    lines.push(key_hint("Enter", "Verify"));
    lines.push(key_hint("Esc", "Quit"));
    dialog(f, area, "Serial number check", PRIMARY, lines);
}

fn draw_serial_confirmed(f: &mut Frame, area: Rect, session: &WizardSession) {
    dialog(
        f,
        area,
        "Serial number check",
        SUCCESS,
        vec![
            Line::raw(""),
            Line::styled("Serial number verified", Style::default().fg(SUCCESS).add_modifier(Modifier::BOLD)),
            Line::raw(system_serial(session)),
            Line::raw(""),
            key_hint("Enter", "Write qualification record"),
            key_hint("Q/Esc", "Quit without a record"),
        ],
    );
}

fn draw_mismatch(f: &mut Frame, area: Rect, session: &WizardSession) {
    dialog(
        f,
        area,
        "Serial number mismatch",
        ERROR,
        vec![
            Line::raw(""),
            Line::from(vec![
                Span::styled("Entered: ", Style::default().fg(MUTED)),
                Span::styled(session.entered_serial().to_string(), Style::default().fg(ERROR)),
            ]),
            Line::from(vec![
                Span::styled("System:  ", Style::default().fg(MUTED)),
                Span::raw(system_serial(session)),
            ]),
            Line::raw(""),
            key_hint("R", "Retry entry"),
            key_hint("B", "Reboot the unit"),
            key_hint("S", "Shut the unit down"),
            key_hint("Q/Esc", "Quit"),
        ],
    );
}

fn yes_no(value: bool) -> Span<'static> {
    if value {
        Span::styled("yes", Style::default().fg(SUCCESS))
    } else {
        Span::styled("no", Style::default().fg(ERROR))
    }
}

fn draw_done(f: &mut Frame, area: Rect, session: &WizardSession) {
    let log_path = session
        .log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    dialog(
        f,
        area,
        "Qualification complete",
        SUCCESS,
        vec![
            Line::raw(""),
            Line::styled("Log saved to", Style::default().fg(MUTED)),
            Line::styled(log_path, title_style()),
            Line::raw(""),
            Line::from(vec![Span::raw("Display test passed: "), yes_no(session.display_test_passed())]),
            Line::from(vec![Span::raw("Serial number verified: "), yes_no(session.serial_verified())]),
            Line::raw(format!("Serial number: {}", session.entered_serial())),
            Line::raw(""),
            key_hint("R", "Rescan this system"),
            key_hint("Enter/Q", "Quit"),
        ],
    );
}

fn draw_fatal(f: &mut Frame, area: Rect, session: &WizardSession) {
    let message = session
        .failure()
        .map(|failure| failure.message.clone())
        .unwrap_or_else(|| "unknown error".to_string());
    dialog(
        f,
        area,
        "Qualification failed",
        ERROR,
        vec![
            Line::raw(""),
            Line::styled(message, Style::default().fg(ERROR)),
            Line::raw(""),
            Line::styled("Press any key to exit", Style::default().fg(MUTED)),
        ],
    );
}

fn draw_escalated(f: &mut Frame, area: Rect, session: &WizardSession) {
    let text = match session.escalation() {
        Some(PowerAction::Reboot) => "Rebooting...",
        Some(PowerAction::Shutdown) => "Powering off...",
        None => "Exiting...",
    };
    draw_message(f, area, text, WARNING);
}
