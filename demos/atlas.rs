#![allow(clippy::print_stdout)]

use rectpack::{Packer, SlotId};

const PAGE_WIDTH: i32 = 72;
const PAGE_HEIGHT: i32 = 20;

fn render(packer: &Packer) {
    let mut grid = vec![vec![b'.'; packer.width() as usize]; packer.height() as usize];

    for (index, (_, rect)) in packer.slots().enumerate() {
        let glyph = b'a' + (index % 26) as u8;
        for row in grid
            .iter_mut()
            .skip(rect.y as usize)
            .take(rect.height as usize)
        {
            for cell in row.iter_mut().skip(rect.x as usize).take(rect.width as usize) {
                *cell = glyph;
            }
        }
    }

    for row in grid {
        println!("{}", String::from_utf8(row).unwrap());
    }
    println!(
        "{} slots resident, {} of {} px used",
        packer.len(),
        packer.used_area(),
        i64::from(packer.width()) * i64::from(packer.height())
    );
}

fn main() {
    env_logger::init();

    let mut packer = Packer::new(PAGE_WIDTH, PAGE_HEIGHT, 1);

    let sizes = [
        (12, 7),
        (9, 5),
        (20, 4),
        (6, 6),
        (14, 9),
        (5, 3),
        (11, 4),
        (7, 7),
        (16, 5),
        (4, 4),
        (9, 9),
        (22, 3),
    ];

    let mut slots: Vec<SlotId> = vec![];
    for (width, height) in sizes {
        if let Some(slot) = packer.insert(width, height) {
            slots.push(slot);
        } else {
            println!("{}x{} did not fit", width, height);
        }
    }
    render(&packer);

    // Free every other slot, then flood the holes with 3x3 rectangles.
    println!();
    for slot in slots.iter().step_by(2) {
        packer.remove(*slot);
    }
    let mut refills = 0;
    while packer.insert(3, 3).is_some() {
        refills += 1;
    }
    println!("refilled {} 3x3 slots after freeing half the page", refills);
    render(&packer);
}
