// main.rs — 球形图片墙查看器：菜单、状态栏与拖拽交互

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // 在 Release 模式下隐藏控制台窗口

mod gallery;
mod i18n;
mod renderer;

use gallery::Gallery;
use renderer::Renderer;
use sphere_grid::{
    AnimationHandle, CollisionMode, FrameClock, ImageRecord, MotionPhase, Placement,
    PointerEvent, PointerOutcome, RenderTarget, SphereConfig, SphereGrid,
};

use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, WindowBuilder},
};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Placements handed over by the engine each frame.
#[derive(Default)]
struct FrameBuffer {
    placements: Vec<Placement>,
}

impl RenderTarget for FrameBuffer {
    fn render(&mut self, placements: &[Placement]) {
        self.placements.clear();
        self.placements.extend_from_slice(placements);
    }
}

struct ViewerState {
    grid: SphereGrid,
    gallery: Gallery,
    /// 当前图片来源，用于重新加载
    source: Option<PathBuf>,
    show_fps: bool,
    vsync_enabled: bool,
    is_fullscreen: bool,
    current_lang: String,
}

impl ViewerState {
    fn open_source(&mut self, path: &Path) {
        match load_images(path) {
            Ok((images, base_dir)) => match self.grid.set_images(images) {
                Ok(()) => {
                    self.gallery.load(self.grid.images(), base_dir.as_deref());
                    self.source = Some(path.to_path_buf());
                }
                Err(e) => log_load_error(path, &e.to_string()),
            },
            Err(e) => log_load_error(path, &e),
        }
    }

    fn reset_rotation(&mut self) {
        let [pitch, yaw] = self.grid.config().initial_rotation;
        self.grid.set_rotation(pitch, yaw);
    }
}

fn log_load_error(path: &Path, err: &str) {
    log::error!(
        "{}",
        i18n::tr_with(
            "error.load_images",
            &[("path", path.display().to_string()), ("err", err.to_string())]
        )
    );
}

/// A directory is scanned for image files; anything else is read as a JSON
/// manifest whose relative `src` entries resolve next to it.
fn load_images(path: &Path) -> Result<(Vec<ImageRecord>, Option<PathBuf>), String> {
    if path.is_dir() {
        let images = gallery::images_from_dir(path).map_err(|e| e.to_string())?;
        Ok((images, None))
    } else {
        let images = sphere_grid::image::load_manifest(path).map_err(|e| e.to_string())?;
        Ok((images, path.parent().map(Path::to_path_buf)))
    }
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}

fn resolve_config(args: &[String]) -> sphere_grid::Result<SphereConfig> {
    if let Some(path) = arg_value(args, "--config") {
        return SphereConfig::from_json_file(Path::new(&path));
    }
    match arg_value(args, "--preset") {
        Some(name) => Ok(SphereConfig::preset(&name).unwrap_or_else(|| {
            log::warn!("{}", i18n::tr_with("error.unknown_preset", &[("name", name.clone())]));
            SphereConfig::default()
        })),
        None => Ok(SphereConfig::default()),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let lang = i18n::resolve_lang(&args);
    i18n::init(lang.clone());

    let config = match resolve_config(&args) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{}", i18n::tr_with("error.config", &[("err", e.to_string())]));
            std::process::exit(2);
        }
    };
    let grid = match SphereGrid::new(Vec::new(), config) {
        Ok(g) => g,
        Err(e) => {
            log::error!("{}", i18n::tr_with("error.config", &[("err", e.to_string())]));
            std::process::exit(2);
        }
    };

    let event_loop = EventLoop::new();
    let window = match WindowBuilder::new()
        .with_title(i18n::tr("app.title"))
        .with_inner_size(LogicalSize::new(1024, 860))
        .build(&event_loop)
    {
        Ok(w) => Arc::new(w),
        Err(e) => {
            log::error!("{}", i18n::tr_with("error.renderer", &[("err", e.to_string())]));
            std::process::exit(1);
        }
    };

    let mut renderer = match pollster::block_on(Renderer::new(window.clone())) {
        Ok(r) => r,
        Err(e) => {
            log::error!("{}", i18n::tr_with("error.renderer", &[("err", e.to_string())]));
            std::process::exit(1);
        }
    };

    let mut state = ViewerState {
        grid,
        gallery: Gallery::new(),
        source: None,
        show_fps: false,
        vsync_enabled: true,
        is_fullscreen: false,
        current_lang: lang,
    };
    if let Some(src) = arg_value(&args, "--images") {
        state.open_source(Path::new(&src));
    }

    let animation = AnimationHandle::new();
    let mut clock = FrameClock::new();
    let mut frame = FrameBuffer::default();

    // FPS 计算
    let mut last_fps_time = Instant::now();
    let mut frame_count = 0;
    let mut fps = 0.0;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { event, .. } => {
                // 先让 egui 处理事件；球体的指针交互在 egui 内完成
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        animation.cancel();
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                    }

                    WindowEvent::KeyboardInput { input, .. } => {
                        if input.state == ElementState::Pressed {
                            match input.virtual_keycode {
                                Some(VirtualKeyCode::O) => {
                                    if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                                        state.open_source(&dir);
                                    }
                                }
                                Some(VirtualKeyCode::R) => state.reset_rotation(),
                                Some(VirtualKeyCode::Escape) => state.grid.close_detail(),
                                Some(VirtualKeyCode::F11) => {
                                    state.is_fullscreen = !state.is_fullscreen;
                                    window.set_fullscreen(
                                        state
                                            .is_fullscreen
                                            .then_some(Fullscreen::Borderless(None)),
                                    );
                                }
                                _ => {}
                            }
                        }
                    }

                    WindowEvent::DroppedFile(path) => {
                        state.open_source(&path);
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                frame_count += 1;
                let now = Instant::now();
                let since = now.duration_since(last_fps_time).as_secs_f32();
                if since >= 1.0 {
                    fps = frame_count as f32 / since;
                    frame_count = 0;
                    last_fps_time = now;
                }

                let dt = clock.step(now);
                if !state.grid.run_frame(&animation, dt, &mut frame) {
                    return;
                }
                state.gallery.poll(&renderer.egui_ctx);

                let vsync_before = state.vsync_enabled;
                let render_result = renderer.render_with_ui(&window, |ctx| {
                    draw_ui(ctx, &mut state, &frame.placements, fps, &window);
                });
                if state.vsync_enabled != vsync_before {
                    renderer.set_vsync(state.vsync_enabled);
                }

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        animation.cancel();
                        *control_flow = ControlFlow::Exit;
                    }
                    Err(e) => log::error!("render error: {:?}", e),
                }
            }

            Event::MainEventsCleared => {
                if !animation.is_cancelled() {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    });
}

fn draw_ui(
    ctx: &egui::Context,
    state: &mut ViewerState,
    placements: &[Placement],
    fps: f32,
    window: &winit::window::Window,
) {
    let detail_was_open = state.grid.selected().is_some();
    draw_menu(ctx, state, window);
    draw_status_bar(ctx, state, fps);

    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let side = state.grid.config().container_size;
            let rect = egui::Rect::from_center_size(
                ui.max_rect().center(),
                egui::vec2(side, side),
            );

            if state.grid.is_empty() {
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    i18n::tr("status.no_images"),
                    egui::FontId::proportional(18.0),
                    egui::Color32::GRAY,
                );
                return;
            }

            let detail_open = state.grid.selected().is_some();
            let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
            if !detail_open {
                handle_sphere_input(ui, state, rect, &response);
            }

            let painter = ui.painter_at(rect);
            for p in placements {
                paint_placement(&painter, rect.min, p, &state.gallery);
            }

            if detail_open {
                ui.painter().rect_filled(
                    ui.max_rect(),
                    0.0,
                    egui::Color32::from_black_alpha(190),
                );
            }
        });

    draw_detail(ctx, state, detail_was_open);
}

fn handle_sphere_input(
    ui: &egui::Ui,
    state: &mut ViewerState,
    rect: egui::Rect,
    response: &egui::Response,
) {
    let (pressed, released, pointer, touch) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.interact_pos(),
            i.any_touches(),
        )
    });
    let local = pointer.map(|p| glam::Vec2::new(p.x - rect.min.x, p.y - rect.min.y));
    let grid = &mut state.grid;

    if pressed && response.hovered() {
        if let Some(l) = local {
            grid.hover_at(l);
        }
        grid.handle_pointer(if touch {
            PointerEvent::TouchStart(local)
        } else {
            match local {
                Some(l) => PointerEvent::Down(l),
                None => return,
            }
        });
    }

    // 拖拽期间即使指针离开容器也继续跟踪
    if let Some(l) = local {
        let moved = if touch {
            PointerEvent::TouchMove(Some(l))
        } else {
            PointerEvent::Move(l)
        };
        if grid.handle_pointer(moved) == PointerOutcome::None {
            if response.hovered() {
                grid.hover_at(l);
            } else {
                grid.set_hovered(None);
            }
        }
    } else if !touch {
        grid.set_hovered(None);
    }

    if released {
        let outcome = grid.handle_pointer(if touch {
            PointerEvent::TouchEnd
        } else {
            PointerEvent::Up
        });
        if outcome == PointerOutcome::Clicked {
            ui.ctx().request_repaint();
        }
    }

    if response.hovered() {
        ui.ctx().set_cursor_icon(if grid.phase() == MotionPhase::Dragging {
            egui::CursorIcon::Grabbing
        } else {
            egui::CursorIcon::Grab
        });
    }
}

fn paint_placement(painter: &egui::Painter, origin: egui::Pos2, p: &Placement, gallery: &Gallery) {
    let (min, max) = p.drawn_rect();
    let r = egui::Rect::from_min_max(
        origin + egui::vec2(min.x, min.y),
        origin + egui::vec2(max.x, max.y),
    );
    let tint = egui::Color32::WHITE.gamma_multiply(p.opacity);

    match gallery.texture(p.index) {
        Some(tex) => {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(tex.id(), r, uv, tint);
        }
        None => {
            // 加载中 / 无法解码：占位块
            let fill = if gallery.is_broken(p.index) {
                egui::Color32::from_rgb(110, 40, 40)
            } else {
                egui::Color32::from_gray(70)
            };
            painter.rect_filled(r, 6.0, fill.gamma_multiply(p.opacity));
        }
    }

    if p.hovered {
        painter.rect_stroke(r, 6.0, egui::Stroke::new(2.0, tint));
    }
}

fn draw_detail(ctx: &egui::Context, state: &mut ViewerState, was_open: bool) {
    let Some(selected) = state.grid.selected().cloned() else {
        return;
    };
    let index = state
        .grid
        .images()
        .iter()
        .position(|img| img.id == selected.id);
    if let Some(i) = index {
        state.gallery.request_detail(i);
    }

    let mut open = true;
    let mut close_clicked = false;
    let shown = egui::Window::new(selected.caption().to_string())
        .id(egui::Id::new("sphere_detail"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            // 原图解码完成前先显示缩略图
            let tex = index.and_then(|i| {
                state
                    .gallery
                    .detail_texture(i)
                    .or_else(|| state.gallery.texture(i))
            });
            if let Some(tex) = tex {
                let screen = ctx.screen_rect().size();
                let size = tex.size_vec2();
                let fit = (screen.x * 0.7 / size.x).min(screen.y * 0.7 / size.y).min(1.0);
                ui.add(egui::Image::from_texture(egui::load::SizedTexture::new(
                    tex.id(),
                    size * fit,
                )));
            } else {
                ui.label(&selected.alt);
            }
            if let Some(desc) = &selected.description {
                ui.label(desc);
            }
            ui.weak(&selected.src);
            if ui.button(i18n::tr("detail.close")).clicked() {
                close_clicked = true;
            }
        });

    // 点击窗口外部关闭；打开它的那次点击不算
    let clicked_outside = match &shown {
        Some(inner) if was_open => ctx.input(|i| {
            i.pointer.primary_clicked()
                && i
                    .pointer
                    .interact_pos()
                    .map_or(false, |p| !inner.response.rect.contains(p))
        }),
        _ => false,
    };

    if !open || close_clicked || clicked_outside {
        state.grid.close_detail();
        state.gallery.clear_detail();
    }
}

fn draw_menu(ctx: &egui::Context, state: &mut ViewerState, window: &winit::window::Window) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(i18n::tr("menu.file"), |ui| {
                if ui.button(i18n::tr("menu.open_folder")).clicked() {
                    ui.close_menu();
                    if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                        state.open_source(&dir);
                    }
                }
                if ui.button(i18n::tr("menu.open_manifest")).clicked() {
                    ui.close_menu();
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter(&i18n::tr("file.filter.manifest"), &["json"])
                        .pick_file()
                    {
                        state.open_source(&path);
                    }
                }
                if ui.button(i18n::tr("menu.exit")).clicked() {
                    std::process::exit(0);
                }
            });

            ui.menu_button(i18n::tr("menu.view"), |ui| {
                if ui.button(i18n::tr("view.reset")).clicked() {
                    state.reset_rotation();
                    ui.close_menu();
                }

                ui.separator();
                let mut cfg = state.grid.config().clone();
                ui.checkbox(&mut cfg.auto_rotate, i18n::tr("view.auto_rotate"));
                ui.add(
                    egui::Slider::new(&mut cfg.auto_rotate_speed, -3.0..=3.0)
                        .text(i18n::tr("view.auto_rotate_speed")),
                );
                ui.add(
                    egui::Slider::new(&mut cfg.drag_sensitivity, 0.1..=2.0)
                        .text(i18n::tr("view.drag_sensitivity")),
                );
                ui.menu_button(i18n::tr("view.collision_mode"), |ui| {
                    ui.radio_value(
                        &mut cfg.collision_mode,
                        CollisionMode::Sequential,
                        i18n::tr("collision.sequential"),
                    );
                    ui.radio_value(
                        &mut cfg.collision_mode,
                        CollisionMode::Simultaneous,
                        i18n::tr("collision.simultaneous"),
                    );
                });
                if &cfg != state.grid.config() {
                    if let Err(e) = state.grid.set_config(cfg) {
                        log::error!("{}", i18n::tr_with("error.config", &[("err", e.to_string())]));
                    }
                }

                ui.separator();
                if ui
                    .checkbox(&mut state.is_fullscreen, "F11")
                    .changed()
                {
                    window.set_fullscreen(
                        state.is_fullscreen.then_some(Fullscreen::Borderless(None)),
                    );
                }
                ui.checkbox(&mut state.show_fps, i18n::tr("view.show_fps"));
                ui.checkbox(&mut state.vsync_enabled, i18n::tr("view.enable_vsync"));
            });

            ui.menu_button(i18n::tr("menu.language"), |ui| {
                let langs: [(&str, &str); 2] = [("en", "English"), ("zh-Hans", "简体中文")];
                for (code, name) in langs {
                    if ui
                        .radio_value(&mut state.current_lang, code.to_string(), name)
                        .clicked()
                    {
                        i18n::init(state.current_lang.clone());
                        window.set_title(&i18n::tr("app.title"));
                        ui.close_menu();
                    }
                }
            });
        });
    });
}

fn draw_status_bar(ctx: &egui::Context, state: &ViewerState, fps: f32) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let pending = state.gallery.pending();
            if pending > 0 {
                ui.label(
                    egui::RichText::new(i18n::tr_with(
                        "status.loading_images",
                        &[("count", pending.to_string())],
                    ))
                    .color(egui::Color32::YELLOW),
                );
                ui.label("|");
            }

            ui.label(i18n::tr_with(
                "status.images",
                &[("count", state.grid.images().len().to_string())],
            ));
            ui.label("|");
            ui.label(i18n::tr_with(
                "status.phase",
                &[("phase", format!("{:?}", state.grid.phase()))],
            ));
            ui.label("|");

            let rotation = state.grid.rotation();
            ui.label(format!("Yaw: {:.1}°", rotation.y));
            ui.label("|");
            ui.label(format!("Pitch: {:.1}°", rotation.x));

            if let Some(src) = &state.source {
                ui.label("|");
                ui.weak(src.display().to_string());
            }

            if state.show_fps {
                ui.label("|");
                ui.label(
                    egui::RichText::new(format!("FPS: {:.1}", fps)).color(egui::Color32::GREEN),
                );
            }
        });
    });
}
