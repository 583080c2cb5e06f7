// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use cidb_app::{Brand, BrandId, Car, CarId, Comment, CommentId, Picture, PictureId};

use crate::memory::MemoryBackend;

/// Rows the demo backend starts with.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoData {
    pub cars: Vec<Car>,
    pub brands: Vec<Brand>,
    pub comments: Vec<Comment>,
    pub pictures: Vec<Picture>,
}

/// In-memory tables seeded with [`demo_data`].
#[derive(Debug)]
pub struct DemoBackend {
    pub cars: MemoryBackend<Car>,
    pub brands: MemoryBackend<Brand>,
    pub comments: MemoryBackend<Comment>,
    pub pictures: MemoryBackend<Picture>,
}

impl DemoBackend {
    pub fn seeded() -> Self {
        Self::from_data(demo_data())
    }

    pub fn from_data(data: DemoData) -> Self {
        Self {
            cars: MemoryBackend::with_rows(data.cars),
            brands: MemoryBackend::with_rows(data.brands),
            comments: MemoryBackend::with_rows(data.comments),
            pictures: MemoryBackend::with_rows(data.pictures),
        }
    }
}

const MAKERS: [(&str, &str); 62] = [
    ("ABARTH", "Abarth"),
    ("ALFA", "Alfa"),
    ("ROMEO", "Romeo"),
    ("ALPINA", "Alpina"),
    ("ARIEL", "Ariel"),
    ("ASTON", "Aston"),
    ("MARTIN", "Martin"),
    ("AUDI", "Audi"),
    ("BENTLEY", "Bentley"),
    ("BMW", "BMW"),
    ("CADILLAC", "Cadillac"),
    ("CATERHAM", "Caterham"),
    ("CHEVROLET", "Chevrolet"),
    ("CHRYSLER", "Chrysler"),
    ("CITROEN", "Citroën"),
    ("CORVETTE", "Corvette"),
    ("DAIHATSU", "Daihatsu"),
    ("DODGE", "Dodge"),
    ("FERRARI", "Ferrari"),
    ("FIAT", "Fiat"),
    ("FORD", "Ford"),
    ("HONDA", "Honda"),
    ("HYUNDAI", "Hyundai"),
    ("INFINITI", "Infiniti"),
    ("ISUZU", "Isuzu"),
    ("JAGUAR", "Jaguar"),
    ("JEEP", "Jeep"),
    ("KIA", "Kia"),
    ("KTM", "KTM"),
    ("LAMBORGHINI", "Lamborghini"),
    ("LAND", "Land"),
    ("ROVER", "Rover"),
    ("LEXUS", "Lexus"),
    ("LOTUS", "Lotus"),
    ("MASERATI", "Maserati"),
    ("MAYBACH", "Maybach"),
    ("MAZDA", "Mazda"),
    ("MCLAREN", "McLaren"),
    ("MERCEDESBENZ", "Mercedes-Benz"),
    ("MG", "MG"),
    ("MINI", "MINI"),
    ("MITSUBISHI", "Mitsubishi"),
    ("MORGAN", "Morgan"),
    ("NISSAN", "Nissan"),
    ("PERODUA", "Perodua"),
    ("PEUGEOT", "Peugeot"),
    ("PORSCHE", "Porsche"),
    ("PROTON", "Proton"),
    ("RENAULT", "Renault"),
    ("ROLLSROYCE", "Rolls-Royce"),
    ("SAAB", "Saab"),
    ("SEAT", "SEAT"),
    ("SKODA", "Skoda"),
    ("SMART", "smart"),
    ("SSANGYONG", "SsangYong"),
    ("SUBARU", "Subaru"),
    ("SUZUKI", "Suzuki"),
    ("TESLA", "Tesla"),
    ("TOYOTA", "Toyota"),
    ("VAUXHALL", "Vauxhall"),
    ("VOLKSWAGEN", "Volkswagen"),
    ("VOLVO", "Volvo"),
];

pub fn demo_data() -> DemoData {
    let brands = MAKERS
        .iter()
        .zip(0_i64..)
        .map(|((name, realname), id)| Brand {
            id: Some(BrandId::new(id)),
            name: (*name).to_owned(),
            realname: (*realname).to_owned(),
        })
        .collect();

    let cars = vec![
        demo_car(0, "CITROEN", "C2", 2008, Some("Gasoline"), 9_000.0, 13_000.0),
        demo_car(1, "FIAT", "500", 2010, None, 19_000.0, 23.0),
        Car {
            transmission: Some("Automatic".to_owned()),
            ..demo_car(2, "BMW", "X5", 2011, Some("Diesel"), 59_000.0, 77_000.0)
        },
    ];

    let comments = [
        (0, "The Citroen C2 is a small car with a great attitude"),
        (0, "I Love my C2"),
        (
            2,
            "BMW's X5 costs too much for what it's worth. Checkout http://www.youtube.com/watch?v=Bg1TB4dRobY",
        ),
    ]
    .into_iter()
    .zip(0_i64..)
    .map(|((car, text), id)| Comment {
        id: Some(CommentId::new(id)),
        car_id: Some(CarId::new(car)),
        comment: text.to_owned(),
    })
    .collect();

    let pictures = [
        (0, "http://www.babez.de/citroen/c2/picth01.jpg"),
        (0, "http://www.babez.de/citroen/c2/pic02.jpg"),
        (0, "http://www.babez.de/citroen/c2/picth03.jpg"),
        (1, "http://www.dwsauto.com/wp-content/uploads/2008/07/fiat-500-photo.jpg"),
        (1, "http://www.cochesadictos.com/coches/fiat-500/imagenes/index1.jpg"),
        (1, "http://www.cochesadictos.com/coches/fiat-500/imagenes/index4.jpg"),
        (2, "http://www.coches21.com/fotos/100/bmw_x5_457.jpg"),
        (2, "http://www.coches21.com/fotos/100/bmw_x5_460.jpg"),
        (2, "http://www.coches21.com/modelos/250/bmw_x5_65.jpg"),
    ]
    .into_iter()
    .zip(0_i64..)
    .map(|((car, url), id)| Picture {
        id: Some(PictureId::new(id)),
        car_id: Some(CarId::new(car)),
        picture: url.to_owned(),
    })
    .collect();

    DemoData {
        cars,
        brands,
        comments,
        pictures,
    }
}

fn demo_car(
    cid: i64,
    maker: &str,
    model: &str,
    year: i32,
    fuel: Option<&str>,
    current: f64,
    new: f64,
) -> Car {
    Car {
        cid: Some(CarId::new(cid)),
        maker: maker.to_owned(),
        model: model.to_owned(),
        year: Some(year),
        fuel: fuel.map(str::to_owned),
        transmission: Some("Manual".to_owned()),
        currentmarketvalue: Some(current),
        newvalue: Some(new),
    }
}
