use std::time::Duration;

use maze_quest_core::{
    CellCoord, Combatant, CombatEvent, Direction, Enemy, EnemyId, EnemyKind, Event, Health,
    ItemKind, Launch, Player, ProjectileOwner, Weapon, ARROW_SPEED, BOMB_DAMAGE, BOMB_FUSE,
    ENEMY_ATTACK_COOLDOWN, PLAYER_MAX_HEALTH,
};
use maze_quest_system_combat::CombatResolver;

fn attack(player: &mut Player, enemies: &mut [Enemy], weapon: Weapon) -> (Vec<Launch>, Vec<Event>) {
    let mut launches = Vec::new();
    let mut events = Vec::new();
    CombatResolver::default().player_attack(weapon, player, enemies, &mut launches, &mut events);
    (launches, events)
}

#[test]
fn level_two_sword_kills_a_wounded_enemy_once() {
    let mut player = Player::new(CellCoord::new(1, 1));
    player.upgrade_weapon();
    player.face(Direction::East);
    let mut enemies =
        vec![Enemy::spawn(EnemyId::new(1), EnemyKind::Chaser, CellCoord::new(2, 1)).with_health(15)];

    let (launches, events) = attack(&mut player, &mut enemies, Weapon::Sword);

    assert!(launches.is_empty());
    assert_eq!(
        events,
        vec![
            Event::AttackPerformed {
                weapon: Weapon::Sword
            },
            Event::Combat(CombatEvent {
                attacker: Combatant::Player,
                target: Combatant::Enemy(EnemyId::new(1)),
                damage: 15,
                killed: true,
            }),
        ]
    );
    assert_eq!(enemies[0].health(), Health::ZERO);

    let (_, again) = attack(&mut player, &mut enemies, Weapon::Sword);
    assert_eq!(
        again,
        vec![Event::AttackPerformed {
            weapon: Weapon::Sword
        }]
    );
}

#[test]
fn sword_hits_own_and_facing_cells_only() {
    let mut player = Player::new(CellCoord::new(2, 2));
    player.face(Direction::North);
    let mut enemies = vec![
        Enemy::spawn(EnemyId::new(1), EnemyKind::Boss, CellCoord::new(2, 2)),
        Enemy::spawn(EnemyId::new(2), EnemyKind::Boss, CellCoord::new(2, 1)),
        Enemy::spawn(EnemyId::new(3), EnemyKind::Boss, CellCoord::new(2, 3)),
        Enemy::spawn(EnemyId::new(4), EnemyKind::Boss, CellCoord::new(3, 2)),
    ];

    let (_, events) = attack(&mut player, &mut enemies, Weapon::Sword);

    let struck: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::Combat(CombatEvent {
                target: Combatant::Enemy(id),
                ..
            }) => Some(id.get()),
            _ => None,
        })
        .collect();
    assert_eq!(struck, vec![1, 2]);
    assert_eq!(enemies[2].health().get(), EnemyKind::Boss.stats().health);
}

#[test]
fn bow_requests_an_arrow_along_the_facing() {
    let mut player = Player::new(CellCoord::new(4, 4));
    player.face(Direction::West);
    player.upgrade_weapon();
    player.upgrade_weapon();

    let (launches, events) = attack(&mut player, &mut [], Weapon::Bow);

    assert_eq!(
        events,
        vec![Event::AttackPerformed { weapon: Weapon::Bow }]
    );
    assert_eq!(
        launches,
        vec![Launch::Directional {
            owner: ProjectileOwner::Player,
            origin: CellCoord::new(4, 4),
            heading: Direction::West.heading(),
            speed: ARROW_SPEED,
            damage: 15,
        }]
    );
}

#[test]
fn bomb_without_charges_does_nothing() {
    let mut player = Player::new(CellCoord::new(0, 0));

    let (launches, events) = attack(&mut player, &mut [], Weapon::Bomb);

    assert!(launches.is_empty());
    assert!(events.is_empty());
    assert_eq!(player.inventory().count(ItemKind::Bomb), 0);
}

#[test]
fn bomb_spends_a_charge() {
    let mut player = Player::new(CellCoord::new(3, 1));
    player.inventory_mut().add(ItemKind::Bomb, 2);

    let (launches, _) = attack(&mut player, &mut [], Weapon::Bomb);

    assert_eq!(player.inventory().count(ItemKind::Bomb), 1);
    assert_eq!(
        launches,
        vec![Launch::Bomb {
            origin: CellCoord::new(3, 1),
            fuse: BOMB_FUSE,
            damage: BOMB_DAMAGE,
        }]
    );
}

#[test]
fn contact_damage_respects_the_per_enemy_cooldown() {
    let resolver = CombatResolver::default();
    assert_eq!(resolver.cooldown(), ENEMY_ATTACK_COOLDOWN);
    let mut player = Player::new(CellCoord::new(1, 1));
    let mut enemies = vec![
        Enemy::spawn(EnemyId::new(1), EnemyKind::Chaser, CellCoord::new(1, 1)),
        Enemy::spawn(EnemyId::new(2), EnemyKind::Ranged, CellCoord::new(1, 2)),
    ];
    let chaser_damage = EnemyKind::Chaser.stats().damage;

    let mut events = Vec::new();
    resolver.enemy_contact(Duration::from_millis(100), &mut player, &mut enemies, &mut events);
    assert_eq!(events.len(), 1);
    assert_eq!(player.health().get(), PLAYER_MAX_HEALTH - chaser_damage);

    events.clear();
    resolver.enemy_contact(Duration::from_millis(1_099), &mut player, &mut enemies, &mut events);
    assert!(events.is_empty());

    resolver.enemy_contact(Duration::from_millis(1_100), &mut player, &mut enemies, &mut events);
    assert_eq!(
        events,
        vec![Event::Combat(CombatEvent {
            attacker: Combatant::Enemy(EnemyId::new(1)),
            target: Combatant::Player,
            damage: chaser_damage,
            killed: false,
        })]
    );
    assert_eq!(player.health().get(), PLAYER_MAX_HEALTH - 2 * chaser_damage);
}

#[test]
fn contact_stops_once_the_player_falls() {
    let resolver = CombatResolver::new(Duration::ZERO);
    let mut player = Player::new(CellCoord::new(0, 0));
    let mut enemies: Vec<_> = (1..=12)
        .map(|id| Enemy::spawn(EnemyId::new(id), EnemyKind::Chaser, CellCoord::new(0, 0)))
        .collect();

    let mut events = Vec::new();
    resolver.enemy_contact(Duration::ZERO, &mut player, &mut enemies, &mut events);

    assert!(!player.is_alive());
    assert_eq!(events.len(), 10);
    assert!(matches!(
        events.last(),
        Some(Event::Combat(CombatEvent { killed: true, .. }))
    ));
}

#[test]
fn shorter_cooldowns_let_enemies_strike_sooner() {
    let resolver = CombatResolver::new(Duration::from_millis(250));
    assert_eq!(resolver.cooldown(), Duration::from_millis(250));
    let mut player = Player::new(CellCoord::new(0, 0));
    let mut enemies = vec![Enemy::spawn(
        EnemyId::new(1),
        EnemyKind::Chaser,
        CellCoord::new(0, 0),
    )];

    let mut events = Vec::new();
    for now in [0, 100, 250, 400, 500] {
        resolver.enemy_contact(
            Duration::from_millis(now),
            &mut player,
            &mut enemies,
            &mut events,
        );
    }

    assert_eq!(events.len(), 3);
}
